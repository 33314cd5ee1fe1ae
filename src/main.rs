use std::{sync::Arc, thread};
use task_dispatch::{bind, TaskPool};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Reply {
    value: String,
}

struct Component;

impl Component {
    fn task_func(&self, a: i32, b: String) -> Reply {
        println!("task_func: {a}, {b}");
        Reply {
            value: "result".to_string(),
        }
    }

    fn callback(&self, reply: Reply) {
        println!("{:?} callback result = {}", thread::current().id(), reply.value);
    }
}

fn section(title: &str) {
    println!("\n=======================================");
    println!("{title}");
    println!("=======================================");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("{} concurrent threads are supported.", num_cpus::get());

    let caller = Arc::new(Component);
    let pool = TaskPool::new(0);
    pool.start()?;

    section("Free function");
    let ret = pool.dispatch(
        |a: i32| {
            println!("{:?} work value = {a}", thread::current().id());
            2
        },
        (1,),
    );
    println!("{:?} RESULT = {}", thread::current().id(), ret.wait()?);

    section("Member function");
    let ret = pool.dispatch(bind(caller.clone(), Component::task_func), (1, "test".to_string()));
    println!("{:?} RESULT = {}", thread::current().id(), ret.wait()?.value);

    section("Free function & free callback");
    pool.dispatch_callback(
        |a: i32| {
            println!("{:?} work value = {a}", thread::current().id());
            4
        },
        |v: i32| println!("{:?} callback RESULT = {v}", thread::current().id()),
        (3,),
    )
    .wait()?;

    section("Member function & member callback");
    pool.dispatch_bound_callback(
        caller.clone(),
        Component::task_func,
        Component::callback,
        (1, "test".to_string()),
    )
    .wait()?;

    section("Member function & free callback");
    pool.dispatch_callback(
        bind(caller.clone(), Component::task_func),
        |v: Reply| println!("{:?} callback RESULT = {}", thread::current().id(), v.value),
        (1, "test".to_string()),
    )
    .wait()?;

    section("Free function & member callback");
    pool.dispatch_callback(
        |a: i32, b: String| {
            println!("task_func: {a}, {b}");
            Reply {
                value: "result".to_string(),
            }
        },
        bind(caller.clone(), Component::callback),
        (1, "test".to_string()),
    )
    .wait()?;

    section("Invalid callback");
    let ret = pool.dispatch_callback_opt(
        Some(bind(caller, Component::task_func)),
        None::<fn(Reply)>,
        (1, "test".to_string()),
    );
    if ret.is_valid() {
        ret.wait()?;
    } else {
        println!("Invalid dispatch call");
    }

    pool.stop();
    Ok(())
}

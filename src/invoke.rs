//! Resolves how a callable is invoked: directly, or through a bound instance.
//!
//! Arguments always travel as a tuple, so `Callable<(i32, String)>` is
//! anything that can be called with an `i32` and a `String`. Plain closures
//! and function pointers get the impl for free; methods are paired with the
//! instance they are called on via [`bind`]. The choice is made by the trait
//! system per call site and costs nothing at runtime.

use std::ops::Deref;

pub trait Callable<Args>: Send + 'static {
    type Output: Send + 'static;

    fn call(self, args: Args) -> Self::Output;
}

/// A method paired with the instance it should be called through.
///
/// `instance` is anything that derefs to the receiver (`Arc<T>`, `Box<T>`,
/// `&'static T`), so a method path such as `Component::task_func` can be used
/// as-is for `method`.
#[derive(Debug, Clone)]
pub struct Bound<I, F> {
    instance: I,
    method: F,
}

pub fn bind<I, F>(instance: I, method: F) -> Bound<I, F>
where
    I: Deref,
{
    Bound { instance, method }
}

#[inline]
pub fn invoke<C, Args>(callable: C, args: Args) -> C::Output
where
    C: Callable<Args>,
{
    callable.call(args)
}

macro_rules! impl_callable {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg,)*> Callable<($($arg,)*)> for Func
        where
            Func: FnOnce($($arg),*) -> Ret + Send + 'static,
            Ret: Send + 'static,
        {
            type Output = Ret;

            #[inline]
            #[allow(non_snake_case)]
            fn call(self, ($($arg,)*): ($($arg,)*)) -> Ret {
                self($($arg),*)
            }
        }

        impl<Inst, Func, Ret, $($arg,)*> Callable<($($arg,)*)> for Bound<Inst, Func>
        where
            Inst: Deref + Send + 'static,
            Func: FnOnce(&Inst::Target, $($arg),*) -> Ret + Send + 'static,
            Ret: Send + 'static,
        {
            type Output = Ret;

            #[inline]
            #[allow(non_snake_case)]
            fn call(self, ($($arg,)*): ($($arg,)*)) -> Ret {
                (self.method)(&*self.instance, $($arg),*)
            }
        }
    };
}

impl_callable!();
impl_callable!(A1);
impl_callable!(A1, A2);
impl_callable!(A1, A2, A3);
impl_callable!(A1, A2, A3, A4);
impl_callable!(A1, A2, A3, A4, A5);
impl_callable!(A1, A2, A3, A4, A5, A6);

pub use anyhow::{
    anyhow,
    bail,
    ensure,
};
pub use thiserror::Error;

pub type EmptyResult = anyhow::Result<()>;

// Generates a thiserror enum plus a lower-snake-case constructor for each variant that returns an
// `anyhow::Error`, so call sites can write `bail!(KindError::unsupported(arg))`-style code without
// naming the variant payload twice.
#[macro_export]
macro_rules! err_impl {
    (@hidden $errtype:ident, $item:ident, $ctor:ident, String) => {
        #[allow(dead_code)]
        pub fn $ctor(in_: &str) -> anyhow::Error {
            anyhow::anyhow!{$errtype::$item(in_.into())}
        }
    };

    (@hidden $errtype:ident, $item:ident, $ctor:ident, $($dtype:tt)::+) => {
        #[allow(dead_code)]
        pub fn $ctor(in_: &$($dtype)::+) -> anyhow::Error {
            anyhow::anyhow!{$errtype::$item(in_.clone())}
        }
    };

    ($errtype:ident,
        $(#[$errinfo:meta] $item:ident($($dtype:tt)::+) => $ctor:ident,)+
    ) => {
        #[derive(Debug, $crate::errors::Error)]
        pub enum $errtype {
            $(#[$errinfo] $item($($dtype)::+)),+
        }

        impl $errtype {
            $($crate::err_impl! {@hidden $errtype, $item, $ctor, $($dtype)::+})+
        }
    };
}

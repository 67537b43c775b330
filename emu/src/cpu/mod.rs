/// Picks the instantiation of a handler for one value of a decoded field.
///
/// `specialize!(value, |FIELD| Self::handler::<FIELD, ..>, [0, 1, ..])` binds
/// `FIELD` as a `u32` constant in each arm. Used while building the lookup
/// tables, so a value outside the list stops compilation.
macro_rules! specialize {
    ($value:expr, |$param:ident| $handler:expr, [$($n:literal),* $(,)?]) => {
        match $value {
            $($n => {
                const $param: u32 = $n;
                $handler
            })*
            _ => unreachable!(),
        }
    };
}

#[allow(clippy::cast_possible_truncation)]
pub mod alu;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::too_many_lines)]
pub mod arm;

#[allow(clippy::cast_lossless)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::large_stack_frames)]
#[allow(clippy::module_name_repetitions)]
pub mod arm7tdmi;
pub mod condition;
pub mod cpu_modes;
mod exception;
pub mod hardware;
mod pipeline;
pub mod psr;
mod register_bank;
pub mod registers;

#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_sign_loss)]
pub mod shifter;
mod state;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::too_many_lines)]
pub mod thumb;

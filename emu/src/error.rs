use std::fmt;

/// Errors surfaced by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuError {
    /// A coprocessor instruction was executed. The GBA has no coprocessor, so
    /// the core stops instead of guessing.
    Coprocessor { instruction: u32, address: u32 },
    /// An image does not fit the memory region it is loaded into.
    ImageTooLarge { len: usize, capacity: usize },
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coprocessor {
                instruction,
                address,
            } => write!(
                f,
                "coprocessor instruction 0x{instruction:08X} at 0x{address:08X} is not supported"
            ),
            Self::ImageTooLarge { len, capacity } => {
                write!(f, "image of {len} bytes does not fit in {capacity} bytes")
            }
        }
    }
}

impl std::error::Error for CpuError {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn coprocessor_message() {
        let error = CpuError::Coprocessor {
            instruction: 0xEE01_0F10,
            address: 0x0800_0100,
        };

        assert_eq!(
            error.to_string(),
            "coprocessor instruction 0xEE010F10 at 0x08000100 is not supported"
        );
    }
}

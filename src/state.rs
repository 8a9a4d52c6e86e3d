use std::fmt;

/// Processing stage of a multipart message.
///
/// Shared by [`Decoder`](crate::Decoder) and [`Encoder`](crate::Encoder), which
/// move through the same stages for the same message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Before the first boundary.
    Preamble,
    /// Reading the headers of a part.
    Part,
    /// Reading the body of a part.
    Data,
    /// After the final boundary, waiting for the end of input.
    Epilogue,
    /// Nothing more to do.
    Complete,
}

impl Stage {
    /// Gets the stage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Preamble => "PREAMBLE",
            Stage::Part => "PART",
            Stage::Data => "DATA",
            Stage::Epilogue => "EPILOGUE",
            Stage::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

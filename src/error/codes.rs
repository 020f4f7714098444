#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArguments = 2,
    InvalidPath = 3,
    InvalidPattern = 4,
    Busy = 5,
    PermissionError = 6,
    HistoryError = 7,
    PartialFailure = 8,
    Cancelled = 9,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

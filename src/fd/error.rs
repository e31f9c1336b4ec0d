use derive_more::{Display, Error, From};

#[derive(Debug, Display, Error)]
#[display("close interrupted by signal")]
pub struct InterruptError;

#[derive(Debug, Display, Error)]
#[display("I/O failure while closing")]
pub struct IOError;

#[derive(Debug, Display, Error)]
#[display("storage exhausted during writeback")]
pub struct StorageExhaustedError;

/// The failures `close(2)` documents for a valid descriptor.
///
/// An invalid descriptor is not an error but a panic: see [`close_fd`](crate::fd::close_fd).
#[derive(Debug, Display, From, Error)]
pub enum CloseError {
    Interrupt(InterruptError),
    IO(IOError),
    StorageExhausted(StorageExhaustedError),
}

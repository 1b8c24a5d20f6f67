use crate::Reading;

/// Destination for completed readings.
///
/// Called at most once per sampling cycle, never concurrently for the same session.
pub trait ReadingSink {
    type Error: core::fmt::Debug;

    fn record(&mut self, reading: &Reading, label: &str) -> Result<(), Self::Error>;
}

/// Emits every reading as a CSV line through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReadingSink for LogSink {
    type Error = core::convert::Infallible;

    fn record(&mut self, reading: &Reading, label: &str) -> Result<(), Self::Error> {
        log::info!("{}:>> {}", label, reading);
        Ok(())
    }
}

impl<T: ReadingSink + ?Sized> ReadingSink for &mut T {
    type Error = T::Error;

    fn record(&mut self, reading: &Reading, label: &str) -> Result<(), Self::Error> {
        (**self).record(reading, label)
    }
}

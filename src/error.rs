/// Possible errors from the SHT1x driver.
///
/// A missing acknowledgement from the sensor is not an error; see
/// [`CommandAck`](crate::CommandAck) for the sampled levels.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum Sht1xError<E> {
    /// The sensor did not pull the data line low before the ready timeout.
    Timeout,
    /// Error from the data or clock line.
    PinError(E),
}

impl<E> From<E> for Sht1xError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}

use embedded_hal::digital::{InputPin, OutputPin};

/// Electrical mode of the data line while it is released to the sensor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Plain input, relying on the external pull-up resistor.
    #[default]
    Floating,
    /// Input with the MCU's internal pull-up enabled.
    PullUp,
}

/// A GPIO that can switch direction at runtime.
///
/// The SHT1x data line is driven by the MCU while a command or an
/// acknowledgement is sent, and released to the sensor otherwise. HALs
/// usually model pin direction in the type system, so implementors wrap a
/// flexible/dynamic pin and switch its mode here.
pub trait DataLine: InputPin + OutputPin {
    /// Releases the line and configures it as an input in `mode`.
    fn set_input(&mut self, mode: InputMode) -> Result<(), Self::Error>;

    /// Configures the line as a push-pull output.
    fn set_output(&mut self) -> Result<(), Self::Error>;
}

impl<T: DataLine + ?Sized> DataLine for &mut T {
    #[inline]
    fn set_input(&mut self, mode: InputMode) -> Result<(), Self::Error> {
        T::set_input(self, mode)
    }

    #[inline]
    fn set_output(&mut self) -> Result<(), Self::Error> {
        T::set_output(self)
    }
}

//! Raw code to physical unit conversion.
//!
//! Coefficients come from the SHT1x datasheet for 14-bit temperature and
//! 12-bit humidity resolution.

/// Celsius per temperature count (14-bit).
pub const SCALE_C: f32 = 0.01;
/// Fahrenheit per temperature count (14-bit).
pub const SCALE_F: f32 = 0.018;

// Humidity linearization (12-bit).
const C1: f32 = -4.0;
const C2: f32 = 0.0405;
const C3: f32 = -0.0000028;

// Humidity temperature compensation (14-bit).
const T1: f32 = 0.01;
const T2: f32 = 0.00008;

/// Reference temperature of the humidity compensation, in Celsius.
const REFERENCE_TEMPERATURE_C: f32 = 25.0;

/// Supply voltage dependent temperature offsets as
/// `(volts, celsius offset, fahrenheit offset)`, highest voltage first.
///
/// Offsets are stored as magnitudes and negated when applied.
const VOLTAGE_TABLE: [(f32, f32, f32); 5] = [
    (5.0, 40.1, 40.2),
    (4.0, 39.8, 39.6),
    (3.5, 39.7, 39.5),
    (3.0, 39.6, 39.3),
    (2.5, 39.4, 38.9),
];

/// Conversion coefficients for one supply voltage.
///
/// Computed once when the driver is built and never changed afterwards.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coefficients {
    /// Additive Celsius offset (`d1`).
    pub offset_c: f32,
    /// Celsius per count (`d2`).
    pub scale_c: f32,
    /// Additive Fahrenheit offset.
    pub offset_f: f32,
    /// Fahrenheit per count.
    pub scale_f: f32,
}

impl Coefficients {
    /// Derives the coefficients for a sensor powered at `voltage` volts.
    ///
    /// The offset is interpolated between the first table row whose voltage
    /// lies below `voltage` and the row before it. The supported range is
    /// roughly 2.5 V to 5 V; at or below the lowest breakpoint the offsets of
    /// the lowest row are used.
    pub fn for_voltage(voltage: f32) -> Self {
        let mut offsets = None;

        for pair in VOLTAGE_TABLE.windows(2) {
            let (upper_v, upper_c, upper_f) = pair[0];
            let (lower_v, lower_c, lower_f) = pair[1];

            if voltage > lower_v {
                offsets = Some((
                    -interpolate(upper_c, lower_c, upper_v, voltage),
                    -interpolate(upper_f, lower_f, upper_v, voltage),
                ));
                break;
            }
        }

        let (offset_c, offset_f) = offsets.unwrap_or_else(|| {
            #[cfg(feature = "defmt")]
            defmt::warn!("supply voltage {} V below table, clamping", voltage);

            let (_, lowest_c, lowest_f) = VOLTAGE_TABLE[VOLTAGE_TABLE.len() - 1];
            (-lowest_c, -lowest_f)
        });

        Coefficients {
            offset_c,
            scale_c: SCALE_C,
            offset_f,
            scale_f: SCALE_F,
        }
    }

    /// Converts a raw temperature code to degrees Celsius.
    #[inline]
    pub fn temperature_c(&self, raw: u16) -> f32 {
        raw as f32 * self.scale_c + self.offset_c
    }

    /// Converts a raw temperature code to degrees Fahrenheit.
    #[inline]
    pub fn temperature_f(&self, raw: u16) -> f32 {
        raw as f32 * self.scale_f + self.offset_f
    }

    /// Converts a raw humidity code to temperature compensated relative
    /// humidity in percent.
    ///
    /// `temperature_raw` is the temperature code measured alongside the
    /// humidity. The result is not clamped; values slightly outside 0..=100
    /// are possible near saturation.
    pub fn humidity(&self, raw: u16, temperature_raw: u16) -> f32 {
        let raw = raw as f32;
        let linear = C1 + C2 * raw + C3 * raw * raw;
        let temperature = self.temperature_c(temperature_raw);

        (temperature - REFERENCE_TEMPERATURE_C) * (T1 + T2 * raw) + linear
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::for_voltage(crate::sht1x::DEFAULT_VOLTAGE)
    }
}

/// Offset at `input` volts on the line through `(va, a)` and the origin
/// shifted by `b`: `(a - b) / va * input + b`.
#[inline]
pub fn interpolate(a: f32, b: f32, va: f32, input: f32) -> f32 {
    (a - b) / va * input + b
}

/// Converts a temperature in degrees Celsius to degrees Fahrenheit.
pub const fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 1.8 + 32.0
}

use crate::models::WeatherSample;

/// Reflection coefficient of the grass reference surface
const REFERENCE_ALBEDO: f64 = 0.23;

/// Saturation vapour pressure (kPa) at air temperature (°C).
pub fn saturation_vapour_pressure(temp_c: f64) -> f64 {
    0.6108 * (17.27 * temp_c / (temp_c + 237.3)).exp()
}

/// Slope of the saturation vapour pressure curve (kPa/°C).
pub fn vapour_pressure_slope(temp_c: f64) -> f64 {
    4098.0 * saturation_vapour_pressure(temp_c) / (temp_c + 237.3).powi(2)
}

/// Psychrometric constant (kPa/°C) at elevation (m).
pub fn psychrometric_constant(elevation_m: f64) -> f64 {
    let pressure = 101.3 * ((293.0 - 0.0065 * elevation_m) / 293.0).powf(5.26);
    0.000665 * pressure
}

/// FAO-56 Penman-Monteith reference evapotranspiration for one step (mm).
///
/// Net radiation is approximated by the net shortwave balance of the
/// reference surface. The aerodynamic coefficient scales linearly with the
/// step length (900 for a day).
pub fn reference_et(sample: &WeatherSample, step_hours: f64, elevation_m: f64) -> f64 {
    let t = sample.temperature_c;
    let rh = sample.relative_humidity_percent.clamp(0.0, 100.0);
    let u2 = sample.wind_speed_m_s.max(0.0);

    let es = saturation_vapour_pressure(t);
    let ea = es * (rh / 100.0);
    let delta = vapour_pressure_slope(t);
    let gamma = psychrometric_constant(elevation_m);

    let rs = sample.solar_radiation_w_m2.max(0.0) * 3600.0 * step_hours / 1.0e6;
    let rn = (1.0 - REFERENCE_ALBEDO) * rs;
    let g = if step_hours >= 24.0 { 0.0 } else { 0.1 * rn };
    let cn = 37.5 * step_hours;

    let numerator = 0.408 * delta * (rn - g) + gamma * cn / (t + 273.0) * u2 * (es - ea);
    let denominator = delta + gamma * (1.0 + 0.34 * u2);

    (numerator / denominator).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn weather(temp: f64, rh: f64, wind: f64, solar: f64) -> WeatherSample {
        WeatherSample {
            timestamp: Utc::now(),
            precipitation_mm: 0.0,
            temperature_c: temp,
            relative_humidity_percent: rh,
            wind_speed_m_s: wind,
            solar_radiation_w_m2: solar,
        }
    }

    #[test]
    fn saturation_vapour_pressure_known_values() {
        // FAO-56 Annex 2 table
        assert!((saturation_vapour_pressure(20.0) - 2.338).abs() < 0.002);
        assert!((saturation_vapour_pressure(30.0) - 4.243).abs() < 0.002);
    }

    #[test]
    fn psychrometric_constant_sea_level() {
        assert!((psychrometric_constant(0.0) - 0.0674).abs() < 0.0002);
        assert!(psychrometric_constant(1800.0) < psychrometric_constant(0.0));
    }

    #[test]
    fn saturated_dark_air_does_not_evaporate() {
        assert_eq!(reference_et(&weather(18.0, 100.0, 3.0, 0.0), 1.0, 0.0), 0.0);
    }

    #[test]
    fn sunny_hour_is_plausible() {
        let et = reference_et(&weather(25.0, 50.0, 2.0, 800.0), 1.0, 0.0);
        assert!(et > 0.3 && et < 1.0, "hourly ET0 {}", et);
    }

    #[test]
    fn daily_step_is_plausible() {
        // ~20 MJ/m²/day of global radiation
        let et = reference_et(&weather(24.0, 55.0, 2.0, 231.0), 24.0, 100.0);
        assert!(et > 3.0 && et < 8.0, "daily ET0 {}", et);
    }

    #[test]
    fn drier_air_evaporates_more() {
        let humid = reference_et(&weather(25.0, 80.0, 2.0, 500.0), 1.0, 0.0);
        let dry = reference_et(&weather(25.0, 30.0, 2.0, 500.0), 1.0, 0.0);
        assert!(dry > humid);
    }
}

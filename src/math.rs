pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * (std::f32::consts::PI / 180.0)
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, 0.0)]
    #[test_case(30.0, std::f32::consts::FRAC_PI_6)]
    #[test_case(90.0, std::f32::consts::FRAC_PI_2)]
    #[test_case(-180.0, -std::f32::consts::PI)]
    fn converts(degrees: f32, radians: f32) {
        assert!((deg_to_rad(degrees) - radians).abs() < 1e-6);
    }
}

use rand::rng;
use rand_distr::{Distribution, Normal, Uniform};

/// Symmetric uniform initialization
/// Samples from a uniform distribution U(-bound, bound)
pub fn symmetric_uniform(bound: f64) -> impl Fn() -> f64 {
    let uniform = Uniform::new(-bound, bound).unwrap();

    move || {
        let mut rng = rng();
        uniform.sample(&mut rng)
    }
}

/// Normal initialization
/// Samples from a normal distribution N(mean, std)
pub fn normal(mean: f64, std: f64) -> impl Fn() -> f64 {
    let normal = Normal::new(mean, std).unwrap();

    move || {
        let mut rng = rng();
        normal.sample(&mut rng)
    }
}

/// Kaiming/He uniform initialization
/// Samples from a uniform distribution U(-bound, bound) where bound = sqrt(6 / fan_in)
/// Specifically designed for ReLU activations
pub fn kaiming_uniform(fan_in: usize) -> impl Fn() -> f64 {
    let bound = (6.0 / fan_in as f64).sqrt();
    let uniform = Uniform::new(-bound, bound).unwrap();

    move || {
        let mut rng = rng();
        uniform.sample(&mut rng)
    }
}

/// Kaiming/He normal initialization
/// Samples from a normal distribution N(0, std) where std = sqrt(2 / fan_in)
pub fn kaiming_normal(fan_in: usize) -> impl Fn() -> f64 {
    let std = (2.0 / fan_in as f64).sqrt();
    let normal = Normal::new(0.0, std).unwrap();

    move || {
        let mut rng = rng();
        normal.sample(&mut rng)
    }
}

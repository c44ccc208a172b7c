use crate::config::EsiConfig;

/// Earth Similarity Index from radius, surface gravity and equilibrium
/// temperature:
///
/// `ESI = Π (1 − |x − x₀| / (x + x₀))^(wᵢ / n)`
///
/// with n = 3. Every term lies in [0, 1] for finite non-negative inputs, so
/// the product does too; the clamp only guards rounding. `None` when any
/// input is not finite.
pub fn earth_similarity(
    config: &EsiConfig,
    radius_earth: f64,
    gravity_earth: f64,
    temp_k: f64,
) -> Option<f64> {
    let terms = [
        (radius_earth, config.reference_radius, config.radius_weight),
        (gravity_earth, config.reference_gravity, config.gravity_weight),
        (temp_k, config.reference_temp_k, config.temperature_weight),
    ];
    if terms.iter().any(|&(x, _, _)| !x.is_finite()) {
        return None;
    }
    let n = terms.len() as f64;

    let esi = terms
        .iter()
        .map(|&(x, x0, w)| similarity_term(x, x0).powf(w / n))
        .product::<f64>();
    esi.is_finite().then(|| esi.clamp(0.0, 1.0))
}

fn similarity_term(x: f64, x0: f64) -> f64 {
    let sum = x + x0;
    if sum <= 0.0 {
        return 0.0;
    }
    (1.0 - (x - x0).abs() / sum).clamp(0.0, 1.0)
}

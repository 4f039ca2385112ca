//! Temperature to color mapping.
//!
//! Cold air is blue, neutral air white, warm air orange:
//!
//! | temperature | color |
//! |---|---|
//! | 0.0 | (0, 0, 1) |
//! | 0.5 | (1, 1, 1) |
//! | 1.0 | (1, 0.5, 0) |

use glam::Vec3;

/// Map a temperature in `[0, 1]` to an RGB color in `[0, 1]`.
///
/// Values outside the range are clamped first.
#[inline]
pub fn thermal_color(temperature: f32) -> Vec3 {
    let t = temperature.clamp(0.0, 1.0);
    if t <= 0.5 {
        // blue -> white
        let u = t * 2.0;
        Vec3::new(u, u, 1.0)
    } else {
        // white -> orange
        let u = (t - 0.5) * 2.0;
        Vec3::new(1.0, 1.0 - u * 0.5, 1.0 - u)
    }
}

// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Equal-power stereo panning.
//!
//! Mono input is spread across both outputs. Stereo input keeps its image and folds the
//! opposite channel in as the position moves away from center.

use std::f32::consts::FRAC_PI_2;

use super::PAN_RANGE;

/// Clamps a pan position into the supported range. NaN maps to center.
pub fn clamp_pan(pan: f32) -> f32 {
    if pan.is_nan() {
        return 0.0;
    }
    pan.clamp(*PAN_RANGE.start(), *PAN_RANGE.end())
}

/// Left and right gains for a mono source at the given position.
#[inline]
pub fn mono_gains(pan: f32) -> (f32, f32) {
    let x = (clamp_pan(pan) + 1.0) * 0.5;
    ((x * FRAC_PI_2).cos(), (x * FRAC_PI_2).sin())
}

/// Pans a mono sample, returning (left, right).
#[inline]
pub fn pan_mono(sample: f32, pan: f32) -> (f32, f32) {
    let (left_gain, right_gain) = mono_gains(pan);
    (sample * left_gain, sample * right_gain)
}

/// Pans a stereo frame, returning (left, right).
#[inline]
pub fn pan_stereo(left: f32, right: f32, pan: f32) -> (f32, f32) {
    let pan = clamp_pan(pan);
    if pan <= 0.0 {
        let x = pan + 1.0;
        let (gain_l, gain_r) = ((x * FRAC_PI_2).cos(), (x * FRAC_PI_2).sin());
        (left + right * gain_l, right * gain_r)
    } else {
        let x = pan;
        let (gain_l, gain_r) = ((x * FRAC_PI_2).cos(), (x * FRAC_PI_2).sin());
        (left * gain_l, right + left * gain_r)
    }
}

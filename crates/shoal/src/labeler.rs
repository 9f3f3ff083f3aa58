//! Simulated-annealing label placement, ported from evansenter/D3-Labeler.
//!
//! Labels anchored to circles are nudged by Monte Carlo moves (translations
//! and rotations about the anchor) and scored by an energy function that
//! penalizes long leader lines, crossing leaders, label-label overlap,
//! label-anchor overlap, and placement outside the upper-right quadrant of
//! the anchor. A linear cooling schedule drives the acceptance rate down
//! over the requested number of sweeps.
//!
//! The port keeps the original's arithmetic quirks on purpose, including the
//! NaN behavior of the segment intersection test for collinear leaders and
//! the zero-length-leader orientation fallthrough. The only change is the
//! random source: a seeded [`XorShift64Star`] instead of `Math.random()`.

use crate::error::{Error, Result};
use crate::rng::XorShift64Star;

pub const DEFAULT_MAX_MOVE: f64 = 5.0;
pub const DEFAULT_MAX_ANGLE: f64 = 0.5;

/// A label to place. `(x, y)` is the lower-left corner of the text run; the
/// occupied box extends to `(x + width, y - height)`, shifted down 2 units.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub name: String,
}

/// The circle a label points at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

/// Energy term weights, defaulting to the upstream constants.
#[derive(Clone, Copy, Debug)]
pub struct EnergyWeights {
    pub leader_length: f64,
    pub leader_crossing: f64,
    pub label_overlap: f64,
    pub anchor_overlap: f64,
    pub orientation: f64,
}

impl Default for EnergyWeights {
    fn default() -> Self {
        Self {
            leader_length: 0.2,
            leader_crossing: 1.0,
            label_overlap: 30.0,
            anchor_overlap: 30.0,
            orientation: 3.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AnnealOptions {
    pub random_seed: u64,
    pub max_move: f64,
    pub max_angle: f64,
    pub initial_temperature: f64,
    pub weights: EnergyWeights,
}

impl Default for AnnealOptions {
    fn default() -> Self {
        Self {
            random_seed: 0,
            max_move: DEFAULT_MAX_MOVE,
            max_angle: DEFAULT_MAX_ANGLE,
            initial_temperature: 1.0,
            weights: EnergyWeights::default(),
        }
    }
}

/// Anneals `labels` in place against their `anchors` inside the
/// `width` x `height` box. Each sweep attempts one Monte Carlo move per
/// label, choosing translation or rotation with equal probability.
pub fn anneal(
    labels: &mut [Label],
    anchors: &[Anchor],
    width: f64,
    height: f64,
    sweeps: usize,
    options: &AnnealOptions,
) -> Result<()> {
    if labels.len() != anchors.len() {
        return Err(Error::AnchorCountMismatch {
            labels: labels.len(),
            anchors: anchors.len(),
        });
    }
    if labels.is_empty() || sweeps == 0 {
        return Ok(());
    }

    let mut annealer = Annealer {
        labels,
        anchors,
        width,
        height,
        weights: options.weights,
        max_move: options.max_move,
        max_angle: options.max_angle,
        rng: XorShift64Star::new(options.random_seed),
    };
    annealer.run(sweeps, options.initial_temperature);
    Ok(())
}

struct Annealer<'a> {
    labels: &'a mut [Label],
    anchors: &'a [Anchor],
    width: f64,
    height: f64,
    weights: EnergyWeights,
    max_move: f64,
    max_angle: f64,
    rng: XorShift64Star,
}

impl Annealer<'_> {
    fn run(&mut self, sweeps: usize, initial_temperature: f64) {
        let mut temperature = initial_temperature;
        let step = initial_temperature / sweeps as f64;
        for _ in 0..sweeps {
            for _ in 0..self.labels.len() {
                if self.rng.next_f64_unit() < 0.5 {
                    self.mc_move(temperature);
                } else {
                    self.mc_rotate(temperature);
                }
            }
            temperature -= step;
        }
    }

    /// Placement cost of the label at `index` against everything else.
    fn energy(&self, index: usize) -> f64 {
        let lab = &self.labels[index];
        let anc = self.anchors[index];
        let w = &self.weights;
        let mut ener = 0.0;

        let mut dx = lab.x - anc.x;
        let mut dy = anc.y - lab.y;
        let dist = (dx * dx + dy * dy).sqrt();

        if dist > 0.0 {
            ener += dist * w.leader_length;
        }

        // Quadrant bias: cheapest above-right of the anchor, dearest
        // below-right. A zero-length leader divides to NaN, fails every
        // comparison and lands in the last arm, as upstream does.
        dx /= dist;
        dy /= dist;
        let quadrant = if dx > 0.0 && dy > 0.0 {
            0.0
        } else if dx < 0.0 && dy > 0.0 {
            1.0
        } else if dx < 0.0 && dy < 0.0 {
            2.0
        } else {
            3.0
        };
        ener += quadrant * w.orientation;

        let x21 = lab.x;
        let y21 = lab.y - lab.height + 2.0;
        let x22 = lab.x + lab.width;
        let y22 = lab.y + 2.0;

        for i in 0..self.labels.len() {
            if i != index {
                let other = &self.labels[i];

                if segments_intersect(
                    (anc.x, anc.y),
                    (lab.x, lab.y),
                    (self.anchors[i].x, self.anchors[i].y),
                    (other.x, other.y),
                ) {
                    ener += w.leader_crossing;
                }

                let x11 = other.x;
                let y11 = other.y - other.height + 2.0;
                let x12 = other.x + other.width;
                let y12 = other.y + 2.0;
                let x_overlap = (x12.min(x22) - x11.max(x21)).max(0.0);
                let y_overlap = (y12.min(y22) - y11.max(y21)).max(0.0);
                ener += x_overlap * y_overlap * w.label_overlap;
            }

            // Anchor overlap counts the label's own anchor too.
            let a = self.anchors[i];
            let x11 = a.x - a.r;
            let y11 = a.y - a.r;
            let x12 = a.x + a.r;
            let y12 = a.y + a.r;
            let x_overlap = (x12.min(x22) - x11.max(x21)).max(0.0);
            let y_overlap = (y12.min(y22) - y11.max(y21)).max(0.0);
            ener += x_overlap * y_overlap * w.anchor_overlap;
        }
        ener
    }

    fn mc_move(&mut self, temperature: f64) {
        let i = self.rng.next_usize(self.labels.len());
        let x_old = self.labels[i].x;
        let y_old = self.labels[i].y;
        let old_energy = self.energy(i);

        self.labels[i].x += (self.rng.next_f64_unit() - 0.5) * self.max_move;
        self.labels[i].y += (self.rng.next_f64_unit() - 0.5) * self.max_move;

        // Hard walls, per axis: a step out of the box reverts that axis
        // only, the other keeps its new value.
        if self.labels[i].x > self.width || self.labels[i].x < 0.0 {
            self.labels[i].x = x_old;
        }
        if self.labels[i].y > self.height || self.labels[i].y < 0.0 {
            self.labels[i].y = y_old;
        }

        let delta = self.energy(i) - old_energy;
        // Metropolis criterion, written so a NaN acceptance rejects.
        if !(self.rng.next_f64_unit() < (-delta / temperature).exp()) {
            self.labels[i].x = x_old;
            self.labels[i].y = y_old;
        }
    }

    fn mc_rotate(&mut self, temperature: f64) {
        let i = self.rng.next_usize(self.labels.len());
        let x_old = self.labels[i].x;
        let y_old = self.labels[i].y;
        let old_energy = self.energy(i);

        let angle = (self.rng.next_f64_unit() - 0.5) * self.max_angle;
        let (s, c) = angle.sin_cos();
        let anchor = self.anchors[i];
        let x = self.labels[i].x - anchor.x;
        let y = self.labels[i].y - anchor.y;
        self.labels[i].x = x * c - y * s + anchor.x;
        self.labels[i].y = x * s + y * c + anchor.y;

        if self.labels[i].x > self.width || self.labels[i].x < 0.0 {
            self.labels[i].x = x_old;
        }
        if self.labels[i].y > self.height || self.labels[i].y < 0.0 {
            self.labels[i].y = y_old;
        }

        let delta = self.energy(i) - old_energy;
        if !(self.rng.next_f64_unit() < (-delta / temperature).exp()) {
            self.labels[i].x = x_old;
            self.labels[i].y = y_old;
        }
    }
}

/// Whether segment `a1 -> a2` crosses segment `b1 -> b2`, after Paul
/// Bourke's line-line intersection. Parallel segments produce infinite
/// parameters and report no crossing; collinear ones produce NaN and
/// report a crossing, faithfully to the original.
fn segments_intersect(a1: (f64, f64), a2: (f64, f64), b1: (f64, f64), b2: (f64, f64)) -> bool {
    let denom = (b2.1 - b1.1) * (a2.0 - a1.0) - (b2.0 - b1.0) * (a2.1 - a1.1);
    let numera = (b2.0 - b1.0) * (a1.1 - b1.1) - (b2.1 - b1.1) * (a1.0 - b1.0);
    let numerb = (a2.0 - a1.0) * (a1.1 - b1.1) - (a2.1 - a1.1) * (a1.0 - b1.0);

    let mua = numera / denom;
    let mub = numerb / denom;
    !(mua < 0.0 || mua > 1.0 || mub < 0.0 || mub > 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(x: f64, y: f64, width: f64, height: f64) -> Label {
        Label {
            x,
            y,
            width,
            height,
            name: String::new(),
        }
    }

    #[test]
    fn label_and_anchor_counts_must_match() {
        let mut labels = vec![label(0.0, 0.0, 10.0, 5.0), label(5.0, 5.0, 10.0, 5.0)];
        let anchors = [Anchor {
            x: 0.0,
            y: 0.0,
            r: 3.0,
        }];
        let err = anneal(
            &mut labels,
            &anchors,
            100.0,
            100.0,
            10,
            &AnnealOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::AnchorCountMismatch {
                labels: 2,
                anchors: 1
            }
        ));
    }

    #[test]
    fn empty_input_is_a_no_op() {
        anneal(&mut [], &[], 100.0, 100.0, 10, &AnnealOptions::default()).unwrap();
    }

    #[test]
    fn labels_starting_inside_the_box_stay_inside() {
        let mut labels = vec![
            label(50.0, 50.0, 12.0, 5.0),
            label(60.0, 60.0, 12.0, 5.0),
            label(40.0, 70.0, 12.0, 5.0),
        ];
        let anchors = [
            Anchor {
                x: 55.0,
                y: 55.0,
                r: 4.0,
            },
            Anchor {
                x: 58.0,
                y: 62.0,
                r: 4.0,
            },
            Anchor {
                x: 45.0,
                y: 68.0,
                r: 4.0,
            },
        ];
        anneal(
            &mut labels,
            &anchors,
            100.0,
            100.0,
            40,
            &AnnealOptions::default(),
        )
        .unwrap();
        for l in &labels {
            assert!((0.0..=100.0).contains(&l.x), "x escaped: {}", l.x);
            assert!((0.0..=100.0).contains(&l.y), "y escaped: {}", l.y);
        }
    }

    #[test]
    fn energy_of_a_lone_label_is_leader_plus_orientation() {
        let mut labels = vec![label(10.0, 10.0, 5.0, 5.0)];
        let anchors = [Anchor {
            x: 0.0,
            y: 0.0,
            r: 1.0,
        }];
        let annealer = Annealer {
            labels: &mut labels,
            anchors: &anchors,
            width: 100.0,
            height: 100.0,
            weights: EnergyWeights::default(),
            max_move: DEFAULT_MAX_MOVE,
            max_angle: DEFAULT_MAX_ANGLE,
            rng: XorShift64Star::new(1),
        };
        // Leader length sqrt(200) * 0.2, below-right quadrant 3 * 3.
        let expected = 200.0_f64.sqrt() * 0.2 + 9.0;
        assert!((annealer.energy(0) - expected).abs() < 1e-12);
    }

    #[test]
    fn stacked_labels_pay_the_overlap_penalty() {
        let mut labels = vec![label(0.0, 0.0, 20.0, 10.0), label(0.0, 0.0, 20.0, 10.0)];
        let anchors = [
            Anchor {
                x: 50.0,
                y: 50.0,
                r: 5.0,
            },
            Anchor {
                x: 50.0,
                y: 50.0,
                r: 5.0,
            },
        ];
        let annealer = Annealer {
            labels: &mut labels,
            anchors: &anchors,
            width: 100.0,
            height: 100.0,
            weights: EnergyWeights::default(),
            max_move: DEFAULT_MAX_MOVE,
            max_angle: DEFAULT_MAX_ANGLE,
            rng: XorShift64Star::new(1),
        };
        // 20 x 10 of shared box at 30 per unit dominates everything else.
        assert!(annealer.energy(0) > 1500.0);
    }

    #[test]
    fn annealing_is_deterministic_for_a_seed() {
        let run = || {
            let mut labels = vec![
                label(30.0, 30.0, 15.0, 6.0),
                label(32.0, 31.0, 15.0, 6.0),
                label(60.0, 40.0, 15.0, 6.0),
            ];
            let anchors = [
                Anchor {
                    x: 35.0,
                    y: 35.0,
                    r: 6.0,
                },
                Anchor {
                    x: 38.0,
                    y: 36.0,
                    r: 6.0,
                },
                Anchor {
                    x: 55.0,
                    y: 45.0,
                    r: 6.0,
                },
            ];
            let options = AnnealOptions {
                random_seed: 42,
                ..AnnealOptions::default()
            };
            anneal(&mut labels, &anchors, 200.0, 150.0, 30, &options).unwrap();
            labels
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(
            (0.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (10.0, 0.0)
        ));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        assert!(!segments_intersect(
            (0.0, 0.0),
            (10.0, 0.0),
            (0.0, 5.0),
            (10.0, 5.0)
        ));
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        assert!(!segments_intersect(
            (0.0, 0.0),
            (1.0, 0.0),
            (3.0, 5.0),
            (3.0, 6.0)
        ));
    }

    #[test]
    fn collinear_segments_report_an_intersection() {
        // 0/0 parameters are NaN, which the original's range test lets
        // through even for disjoint spans.
        assert!(segments_intersect(
            (0.0, 0.0),
            (10.0, 0.0),
            (20.0, 0.0),
            (30.0, 0.0)
        ));
    }
}

//! The chart session: data, both simulations, and the settled scene.
//!
//! A [`ChartSession`] owns everything a browser build of this chart keeps in
//! module globals. Selecting a measure/comparison pair rebuilds the scene in
//! one pass: filter records, pack the group circles with a force simulation
//! run to rest, anneal the labels around them, then reconcile the person
//! dots and leave their simulation hot for the caller to drive with
//! [`ChartSession::tick`].

use crate::Result;
use crate::model::{AnchorLayout, ChartLayout, GroupLayout, LabelLayout, NodeLayout};
use crate::svg::{connector_path, render_svg};
use crate::text::{DeterministicTextMeasurer, TextMeasurer, TextStyle, wrap_text};
use dotcensus_core::geom::{Point, point};
use dotcensus_core::{ChartConfig, OrdinalScale, Record, RecordSource, Selection, hex_to_rgba};
use shoal::geom::random_point_in_disk;
use shoal::{
    Anchor, AnnealOptions, Body, CenterForce, CollideForce, Force, Label, ManyBodyForce,
    PositionForce, Simulation, XorShift64Star, anneal,
};
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Vertical advance between stacked label lines, matching the tspan dy step.
pub(crate) const LINE_ADVANCE: f64 = 15.0;

#[derive(Clone)]
pub struct ChartOptions {
    pub config: ChartConfig,
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            config: ChartConfig::default(),
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

/// A group settled by the packing pass, plus its annotation.
struct ResolvedGroup {
    record: Record,
    center: Point,
    r: f64,
    lines: Vec<String>,
    label: Label,
    anchor: Anchor,
    connector: String,
}

/// One person dot. Its live position and velocity sit in the member
/// simulation at the same index; `published` is the last clamped position
/// handed out through [`ChartSession::layout`].
struct Member {
    id: u64,
    group: usize,
    published: Point,
}

pub struct ChartSession {
    config: ChartConfig,
    text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    source: Option<Box<dyn RecordSource + Send + Sync>>,
    /// `None` until the first update with a source attached; a failed fetch
    /// is cached too and reported on every update, like a rejected promise.
    dataset: Option<std::result::Result<Vec<Record>, String>>,
    palette: OrdinalScale,
    selection: Selection,
    background_color: String,
    content_color: String,
    groups: Vec<ResolvedGroup>,
    members: Vec<Member>,
    member_sim: Simulation,
    next_member_id: u64,
    group_seed: u64,
    member_seed: u64,
    anneal_seed: u64,
    spread_rng: XorShift64Star,
}

impl ChartSession {
    pub fn new(options: ChartOptions) -> Self {
        let ChartOptions {
            config,
            text_measurer,
        } = options;

        // One master stream fans out a fixed seed per concern so that, for
        // a given `random_seed`, group packing, dot spreading, collision
        // jiggle and label annealing each replay identically.
        let mut seeds = XorShift64Star::new(config.random_seed);
        let group_seed = seeds.next_u64();
        let member_seed = seeds.next_u64();
        let anneal_seed = seeds.next_u64();
        let spread_rng = XorShift64Star::new(seeds.next_u64());

        let mut palette = OrdinalScale::new(config.palette.clone());
        let selection = Selection::none();
        // The sentinel selection claims the first palette slot up front.
        let background_color = palette.color_for(&selection.measure);

        Self {
            member_sim: Simulation::new(Vec::new(), member_seed),
            config,
            text_measurer,
            source: None,
            dataset: None,
            palette,
            selection,
            background_color,
            content_color: String::new(),
            groups: Vec::new(),
            members: Vec::new(),
            next_member_id: 0,
            group_seed,
            member_seed,
            anneal_seed,
            spread_rng,
        }
    }

    /// Attaches (or replaces) the record source. The dataset is fetched
    /// lazily on the next update.
    pub fn set_source(&mut self, source: Box<dyn RecordSource + Send + Sync>) {
        self.source = Some(source);
        self.dataset = None;
    }

    /// Selects a measure/comparison pair and rebuilds the scene.
    pub fn select(&mut self, measure: &str, comparison: &str) -> Result<()> {
        self.selection = Selection::new(measure, comparison);
        self.update()
    }

    /// Rebuilds the scene for the current selection.
    pub fn refresh(&mut self) -> Result<()> {
        self.update()
    }

    /// Changes the canvas size and rebuilds the scene. Surviving dots keep
    /// their identity, position and velocity through the reflow.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
        self.config.width = width;
        self.config.height = height;
        self.update()
    }

    fn update(&mut self) -> Result<()> {
        let width = self.config.width;
        let height = self.config.height;
        let margin = self.config.margin;

        // The canvas recolors before any data concern, so a broken source
        // still gives visual feedback for the new selection.
        self.background_color = self.palette.color_for(&self.selection.measure);
        self.content_color = hex_to_rgba(&self.background_color)?;

        if self.dataset.is_none() {
            if let Some(source) = &self.source {
                self.dataset = Some(source.fetch().map_err(|err| err.to_string()));
            }
        }
        let records: Vec<Record> = match &self.dataset {
            Some(Ok(all)) => all
                .iter()
                .filter(|record| self.selection.matches(record))
                .cloned()
                .collect(),
            Some(Err(message)) => {
                error!(%message, "could not load data");
                return Ok(());
            }
            None => {
                debug!("no record source attached yet");
                return Ok(());
            }
        };

        let n = records.len();
        let mark_span = self.config.mark_radius + self.config.mark_margin;
        let mut radii = Vec::with_capacity(n);
        let mut group_lines = Vec::with_capacity(n);
        for record in &records {
            // Rough inverse of circle packing: the disk area that n dots
            // of pitch `mark_span` will roughly fill.
            radii.push((record.value * mark_span * 35.0 / PI).sqrt());
            group_lines.push(wrap_text(&record.group, self.config.label_max_chars));
        }

        // Pack the groups: gravity toward the canvas center, short-range
        // attraction and long-range repulsion between clusters, and a wide
        // collision disk to keep them apart.
        let mut group_sim = Simulation::new(vec![Body::unplaced(); n], self.group_seed);
        group_sim.set_forces(vec![
            Force::Center(CenterForce {
                x: width / 2.0,
                y: height / 2.0,
            }),
            Force::ManyBody(ManyBodyForce {
                strength: 1010.0,
                distance_min: 10.0,
                ..ManyBodyForce::default()
            }),
            Force::ManyBody(ManyBodyForce {
                strength: -1000.0,
                distance_max: width.min(height) - margin * 2.0 + 90.0,
                ..ManyBodyForce::default()
            }),
            Force::Collide(CollideForce::new(75.0)),
        ])?;

        let mut ticks = 0usize;
        while group_sim.active() {
            if ticks >= self.config.max_resolve_ticks {
                warn!(ticks, "group placement hit the tick cap before settling");
                break;
            }
            group_sim.tick();
            ticks += 1;
            // Walls: every cluster stays fully inside the canvas margins.
            for (body, &r) in group_sim.bodies_mut().iter_mut().zip(&radii) {
                body.x = body.x.max(margin + r).min(width - margin * 2.0 - r);
                body.y = body.y.max(margin + r).min(height - margin * 2.0 - r);
            }
        }

        let mut centers = Vec::with_capacity(n);
        for body in group_sim.bodies() {
            // Head room for the label block above each cluster.
            centers.push(point(body.x, body.y + 40.0));
        }

        let style = TextStyle {
            font_size: self.config.label_font_size,
            ..TextStyle::default()
        };
        let mut labels = Vec::with_capacity(n);
        let mut anchors = Vec::with_capacity(n);
        for i in 0..n {
            let metrics = self
                .text_measurer
                .measure(&group_lines[i].join("\n"), &style);
            labels.push(Label {
                x: centers[i].x,
                y: centers[i].y - radii[i] - 3.0 - LINE_ADVANCE * group_lines[i].len() as f64,
                width: metrics.width,
                height: metrics.height,
                name: records[i].group.clone(),
            });
            anchors.push(Anchor {
                x: centers[i].x,
                y: centers[i].y,
                r: radii[i] + 20.0,
            });
        }
        anneal(
            &mut labels,
            &anchors,
            width - margin * 2.0,
            height - margin * 2.0,
            2 * n,
            &AnnealOptions {
                random_seed: self.anneal_seed,
                ..AnnealOptions::default()
            },
        )?;

        let mut groups = Vec::with_capacity(n);
        for (i, (record, label)) in records.into_iter().zip(labels).enumerate() {
            let connector = connector_path(centers[i].x, centers[i].y, radii[i], label.x, label.y);
            groups.push(ResolvedGroup {
                record,
                center: centers[i],
                r: radii[i],
                lines: std::mem::take(&mut group_lines[i]),
                label,
                anchor: anchors[i],
                connector,
            });
        }

        // Reconcile dots positionally: the flattened index decides which
        // old dot survives, so dots flow between groups as counts shift and
        // only the tail is ever created or dropped.
        let old_members = std::mem::take(&mut self.members);
        let old_bodies = self.member_sim.bodies().to_vec();
        let mut members = Vec::new();
        let mut bodies = Vec::new();
        for (group_index, group) in groups.iter().enumerate() {
            for _ in 0..group.record.member_count() {
                let idx = members.len();
                if idx < old_members.len() {
                    let old = &old_members[idx];
                    members.push(Member {
                        id: old.id,
                        group: group_index,
                        published: old.published,
                    });
                    bodies.push(old_bodies[idx]);
                } else {
                    let (x, _) = random_point_in_disk(&mut self.spread_rng, 0.0, width, 0.0, height);
                    let (_, y) = random_point_in_disk(&mut self.spread_rng, 0.0, width, 0.0, height);
                    let id = self.next_member_id;
                    self.next_member_id += 1;
                    members.push(Member {
                        id,
                        group: group_index,
                        // A dot spread onto the exact origin column or row
                        // starts out published on its group center instead.
                        published: point(
                            if x == 0.0 || x.is_nan() { group.center.x } else { x },
                            if y == 0.0 || y.is_nan() { group.center.y } else { y },
                        ),
                    });
                    bodies.push(Body::at(x, y));
                }
            }
        }

        // Each dot drifts gently toward its group center and shoulders its
        // neighbors aside. Targets fall back to the canvas center when a
        // group somehow settled on the origin.
        let mut targets_x = Vec::with_capacity(members.len());
        let mut targets_y = Vec::with_capacity(members.len());
        for member in &members {
            let center = groups[member.group].center;
            targets_x.push(if center.x == 0.0 || center.x.is_nan() {
                width / 2.0
            } else {
                center.x
            });
            targets_y.push(if center.y == 0.0 || center.y.is_nan() {
                height / 2.0
            } else {
                center.y
            });
        }
        let mut member_sim = Simulation::new(bodies, self.member_seed);
        member_sim.set_forces(vec![
            Force::PositionX(PositionForce {
                targets: targets_x,
                strength: 0.05,
            }),
            Force::PositionY(PositionForce {
                targets: targets_y,
                strength: 0.05,
            }),
            Force::Collide(CollideForce {
                radius: self.config.mark_margin,
                strength: 1.0,
                iterations: 1,
            }),
        ])?;
        member_sim.set_alpha(1.3);

        self.groups = groups;
        self.members = members;
        self.member_sim = member_sim;
        debug!(
            groups = self.groups.len(),
            people = self.members.len(),
            ticks,
            "scene rebuilt"
        );
        Ok(())
    }

    /// Advances the dot simulation one step and publishes clamped dot
    /// positions. Returns `true` while the simulation still has heat in it;
    /// once it has cooled this is a no-op returning `false`.
    pub fn tick(&mut self) -> bool {
        if !self.member_sim.active() {
            return false;
        }
        self.member_sim.tick();
        let width = self.config.width;
        let height = self.config.height;
        let margin = self.config.margin;
        for (member, body) in self.members.iter_mut().zip(self.member_sim.bodies()) {
            member.published.x = body.x.min(width - margin).max(margin);
            member.published.y = body.y.min(height - margin).max(margin);
        }
        self.member_sim.active()
    }

    /// Snapshot of the current scene.
    pub fn layout(&self) -> ChartLayout {
        ChartLayout {
            width: self.config.width,
            height: self.config.height,
            background_color: self.background_color.clone(),
            content_color: self.content_color.clone(),
            mark_radius: self.config.mark_radius,
            label_font_size: self.config.label_font_size,
            groups: self
                .groups
                .iter()
                .map(|group| GroupLayout {
                    name: group.record.group.clone(),
                    measure: group.record.measure.clone(),
                    comparison: group.record.comparison.clone(),
                    value: group.record.value,
                    x: group.center.x,
                    y: group.center.y,
                    r: group.r,
                    lines: group.lines.clone(),
                    label: LabelLayout {
                        x: group.label.x,
                        y: group.label.y,
                        width: group.label.width,
                        height: group.label.height,
                    },
                    anchor: AnchorLayout {
                        x: group.anchor.x,
                        y: group.anchor.y,
                        r: group.anchor.r,
                    },
                    connector: group.connector.clone(),
                })
                .collect(),
            people: self
                .members
                .iter()
                .map(|member| NodeLayout {
                    id: member.id,
                    group: self.groups[member.group].record.group.clone(),
                    x: member.published.x,
                    y: member.published.y,
                })
                .collect(),
        }
    }

    /// Renders the current scene as a standalone SVG document.
    pub fn render_svg(&self) -> String {
        render_svg(&self.layout())
    }
}

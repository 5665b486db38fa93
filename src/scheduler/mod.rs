//! Scheduler - phase-ordered system execution over the world.
//!
//! Each phase holds an ordered list of registered systems. A frame runs the
//! phases in their fixed order, with the destruction sweep at the start of
//! PreUpdate so no system observes a half-destroyed entity mid-frame.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::ecs::{Entity, Signature, World};

/// Execution phases, run in this order once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Start,
    PreUpdate,
    Update,
    Draw,
    End,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Start,
        Phase::PreUpdate,
        Phase::Update,
        Phase::Draw,
        Phase::End,
    ];

    fn index(self) -> usize {
        match self {
            Phase::Start => 0,
            Phase::PreUpdate => 1,
            Phase::Update => 2,
            Phase::Draw => 3,
            Phase::End => 4,
        }
    }
}

/// Per-frame data handed to every system.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Frame number, starting at 1, matching the `FrameStats` of this run.
    pub frame: u64,
    /// Seconds since the previous frame, supplied by the outer loop.
    pub dt: f32,
}

type GlobalFn = Box<dyn FnMut(&mut World, &FrameContext) -> Result<()>>;
type EntityFn = Box<dyn FnMut(&mut World, &FrameContext, Entity) -> Result<()>>;

enum SystemKind {
    /// Called exactly once per phase, no entity argument.
    Global(GlobalFn),
    /// Called once per entity whose signature is a superset of the mask.
    Filtered { mask: Signature, run: EntityFn },
    /// Called once per live entity carrying any of the tags.
    Tagged { tags: Vec<String>, run: EntityFn },
}

struct SystemEntry {
    name: String,
    kind: SystemKind,
}

/// Statistics for a single frame.
#[derive(Debug, Clone)]
pub struct FrameStats {
    pub frame: u64,
    pub duration: Duration,
    pub system_times: Vec<(String, Duration)>,
    /// Entity invocations skipped because the system returned an error.
    /// Errors never abort the phase or the frame.
    pub entities_skipped: u64,
}

/// Holds the registered systems and drives them, phase by phase.
pub struct Scheduler {
    phases: [Vec<SystemEntry>; 5],
    frame: u64,
    stats_history: Vec<FrameStats>,
    max_stats_history: usize,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            phases: Default::default(),
            frame: 0,
            stats_history: Vec::new(),
            max_stats_history: 100,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Registers a system invoked once per phase, with no entity argument.
    pub fn register(
        &mut self,
        phase: Phase,
        name: impl Into<String>,
        run: impl FnMut(&mut World, &FrameContext) -> Result<()> + 'static,
    ) {
        self.phases[phase.index()].push(SystemEntry {
            name: name.into(),
            kind: SystemKind::Global(Box::new(run)),
        });
    }

    /// Registers a system invoked once per entity whose signature contains
    /// `mask`, in increasing entity-id order. Compose the mask by OR-ing the
    /// bits returned from `World::register_component`.
    pub fn register_filtered(
        &mut self,
        phase: Phase,
        name: impl Into<String>,
        mask: Signature,
        run: impl FnMut(&mut World, &FrameContext, Entity) -> Result<()> + 'static,
    ) {
        self.phases[phase.index()].push(SystemEntry {
            name: name.into(),
            kind: SystemKind::Filtered {
                mask,
                run: Box::new(run),
            },
        });
    }

    /// Registers a system invoked once per live entity whose tag is a member
    /// of `tags`, in increasing entity-id order.
    pub fn register_tagged(
        &mut self,
        phase: Phase,
        name: impl Into<String>,
        tags: Vec<String>,
        run: impl FnMut(&mut World, &FrameContext, Entity) -> Result<()> + 'static,
    ) {
        self.phases[phase.index()].push(SystemEntry {
            name: name.into(),
            kind: SystemKind::Tagged {
                tags,
                run: Box::new(run),
            },
        });
    }

    /// Runs one phase: systems in registration order, each system's entity
    /// set computed freshly at its invocation, entities in increasing id
    /// order. Entities created by an earlier system in the phase are visible
    /// to later ones; kills only take effect at the next sweep.
    ///
    /// Returns how many entity invocations were skipped due to errors.
    pub fn run_phase(&mut self, world: &mut World, ctx: &FrameContext, phase: Phase) -> u64 {
        let mut times = Vec::new();
        self.run_phase_timed(world, ctx, phase, &mut times)
    }

    fn run_phase_timed(
        &mut self,
        world: &mut World,
        ctx: &FrameContext,
        phase: Phase,
        times: &mut Vec<(String, Duration)>,
    ) -> u64 {
        let mut skipped = 0;
        for entry in &mut self.phases[phase.index()] {
            let system_start = Instant::now();
            match &mut entry.kind {
                SystemKind::Global(run) => {
                    if run(world, ctx).is_err() {
                        skipped += 1;
                    }
                }
                SystemKind::Filtered { mask, run } => {
                    for entity in world.query(*mask) {
                        // The set is a snapshot; an earlier error or mutation
                        // this invocation may have disqualified the entity.
                        if !world.signature(entity).contains(*mask) {
                            continue;
                        }
                        if run(world, ctx, entity).is_err() {
                            skipped += 1;
                        }
                    }
                }
                SystemKind::Tagged { tags, run } => {
                    for entity in world.find_tagged(tags) {
                        // Same re-check as the mask path: the snapshot may be
                        // stale once earlier invocations have run. A dead
                        // entity has no tag, so this also covers liveness.
                        let still_tagged = world
                            .tag(entity)
                            .is_some_and(|tag| tags.iter().any(|t| t.as_str() == tag));
                        if !still_tagged {
                            continue;
                        }
                        if run(world, ctx, entity).is_err() {
                            skipped += 1;
                        }
                    }
                }
            }
            times.push((entry.name.clone(), system_start.elapsed()));
        }
        skipped
    }

    /// Executes one full frame: the destruction sweep, then every phase in
    /// fixed order. Returns timing and error counters for the frame.
    pub fn run_frame(&mut self, world: &mut World, dt: f32) -> FrameStats {
        let frame_start = Instant::now();
        // Frames are numbered from 1; the context and the returned stats
        // carry the same number.
        self.frame += 1;
        let ctx = FrameContext {
            frame: self.frame,
            dt,
        };
        let mut system_times = Vec::new();
        let mut entities_skipped = 0;

        for phase in Phase::ALL {
            if phase == Phase::PreUpdate {
                world.sweep();
            }
            entities_skipped += self.run_phase_timed(world, &ctx, phase, &mut system_times);
        }

        let stats = FrameStats {
            frame: self.frame,
            duration: frame_start.elapsed(),
            system_times,
            entities_skipped,
        };
        self.stats_history.push(stats.clone());
        if self.stats_history.len() > self.max_stats_history {
            self.stats_history.remove(0);
        }
        stats
    }

    /// Recent frame statistics, oldest first.
    pub fn recent_stats(&self) -> &[FrameStats] {
        &self.stats_history
    }

    pub fn average_frame_time(&self) -> Option<Duration> {
        if self.stats_history.is_empty() {
            return None;
        }
        let total: Duration = self.stats_history.iter().map(|s| s.duration).sum();
        Some(total / self.stats_history.len() as u32)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

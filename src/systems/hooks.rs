use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    world::World,
};

#[derive(Debug, Clone, Copy)]
enum HookPhase {
    Start,
    End,
}

fn apply_hooks(world: &mut World, phase: HookPhase) {
    // Hook effects may target any cell, including the hook lists' owner, so
    // the list is copied out before application.
    let hooks = match phase {
        HookPhase::Start => world.on_turn_start.clone(),
        HookPhase::End => world.on_turn_end.clone(),
    };
    for hook in &hooks {
        for effect in &hook.effects {
            if let Err(err) = world.apply_effect(effect) {
                world
                    .bookkeeping
                    .effect_failures
                    .push(format!("{}: {err}", hook.name));
            }
        }
    }
}

/// Applies the `on_turn_start` hooks in registration order.
pub struct TurnStartSystem;

impl TurnStartSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TurnStartSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for TurnStartSystem {
    fn name(&self) -> &str {
        "turn_start"
    }

    fn run(&mut self, _ctx: &SystemContext, world: &mut World) -> Result<()> {
        apply_hooks(world, HookPhase::Start);
        Ok(())
    }
}

/// Applies the `on_turn_end` hooks in registration order.
pub struct TurnEndSystem;

impl TurnEndSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TurnEndSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for TurnEndSystem {
    fn name(&self) -> &str {
        "turn_end"
    }

    fn run(&mut self, _ctx: &SystemContext, world: &mut World) -> Result<()> {
        apply_hooks(world, HookPhase::End);
        Ok(())
    }
}

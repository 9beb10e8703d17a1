//! Headless симуляция VOXELFALL
//!
//! Гоняет ядро без рендера на встроенной фикстуре: проверка детерминизма
//! и живой лог событий тика.

use voxelfall_simulation::{SimEvent, Simulation};

fn main() {
    let seed = 42;
    println!("Starting VOXELFALL headless simulation (seed: {})", seed);

    let mut sim = Simulation::with_sample_world(seed);
    let delta = 1.0 / 60.0;

    // Немного input: игрок идёт вперёд первые 3 секунды
    sim.set_input_direction(bevy::math::Vec2::new(0.0, 1.0));

    for tick in 0..1000 {
        if tick == 180 {
            sim.set_input_direction(bevy::math::Vec2::ZERO);
        }

        let events = sim.tick(delta);
        for event in events {
            match event {
                SimEvent::DamageDealt {
                    target, amount, ..
                } => println!("tick {}: {} took {:.1} damage", tick, target, amount),
                SimEvent::StaggerTriggered { entity } => {
                    println!("tick {}: {} staggered", tick, entity)
                }
                SimEvent::EntityDied { entity, .. } => {
                    println!("tick {}: {} died", tick, entity)
                }
                SimEvent::LootDropped { item, .. } => {
                    println!("tick {}: loot dropped ({})", tick, item.name)
                }
                SimEvent::LootCollected { item, .. } => {
                    println!("tick {}: loot collected ({})", tick, item.name)
                }
                SimEvent::SkillCast { skill, .. } => {
                    println!("tick {}: skill cast ({})", tick, skill)
                }
            }
        }

        if tick % 200 == 0 {
            let entities = sim.entities();
            let alive = entities.iter().filter(|e| !e.dead).count();
            println!(
                "tick {}: {} entities ({} alive), elapsed {:.1}s",
                tick,
                entities.len(),
                alive,
                sim.elapsed()
            );
        }
    }

    println!("Simulation complete!");
}

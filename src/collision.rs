//! Collision resolution between registered objects
//!
//! Runs once per frame, after the update pass and before reclaim.
//! Resolution is organized as fixed type-pair passes in a fixed order;
//! within a pass, candidates come from the registry's kind indices in
//! registration order. Tile collision is not handled here - objects
//! resolve against the solid tile layer during their own update.
//!
//! The player-facing passes classify each overlap as a squish (the
//! player descended onto the other party's upper half) or a normal
//! contact, and the receiving objects decide what that means.

use crate::math::{Rectangle, rect_collision, rect_collision_offset};
use crate::object::{CollisionKind, Contact, ContactKind, DyingState, Object, TrackedKind};
use crate::registry::ObjectId;
use crate::sector::Sector;

/// Did a body moving from `prev` to `curr` come down on top of
/// `target`? True when it moved downward and its previous bottom edge
/// was above the target's vertical midpoint.
fn descending_onto(prev: &Rectangle, curr: &Rectangle, target: &Rectangle) -> bool {
    prev.y < curr.y && prev.bottom() < target.mid_y()
}

/// Check an object out, deliver one collision callback, put it back.
fn dispatch(sector: &mut Sector, id: ObjectId, contact: &Contact, kind: CollisionKind) {
    if let Some(mut object) = sector.registry.checkout(id) {
        object.collision(sector, contact, kind);
        sector.registry.restore(id, object);
    }
}

/// Bounds of a live object. Objects already flagged for reclaim take
/// no further part in resolution.
fn bounds_of(sector: &Sector, id: ObjectId) -> Option<Rectangle> {
    let object = sector.registry.get(id)?;
    if !object.is_valid() {
        return None;
    }
    object.bounds()
}

fn enemy_state(sector: &Sector, id: ObjectId) -> Option<(Rectangle, DyingState)> {
    match sector.registry.get(id)? {
        Object::Enemy(enemy) => Some((enemy.base, enemy.dying)),
        _ => None,
    }
}

struct PlayerView {
    base: Rectangle,
    previous_base: Rectangle,
    invincible: bool,
    dying: DyingState,
}

fn player_view(sector: &Sector) -> Option<PlayerView> {
    match sector.registry.get(sector.player_id)? {
        Object::Player(player) => Some(PlayerView {
            base: player.base,
            previous_base: player.previous_base,
            invincible: player.is_invincible(),
            dying: player.dying,
        }),
        _ => None,
    }
}

/// Resolve this frame's collisions. Pass order is load-bearing: shots
/// resolve before the player does, and nothing involving the player
/// runs once the player is dying.
pub(crate) fn handle_collisions(sector: &mut Sector) {
    let projectiles: Vec<ObjectId> = sector.registry.index(TrackedKind::Projectile).to_vec();
    let enemies: Vec<ObjectId> = sector.registry.index(TrackedKind::Enemy).to_vec();

    // Projectiles against enemies. Each shot resolves against at most
    // one enemy; dying enemies are transparent.
    for &shot in &projectiles {
        let Some(shot_base) = bounds_of(sector, shot) else {
            continue;
        };
        for &enemy in &enemies {
            let Some((enemy_base, dying)) = enemy_state(sector, enemy) else {
                continue;
            };
            if dying != DyingState::Not {
                continue;
            }
            if rect_collision(&enemy_base, &shot_base) {
                dispatch(
                    sector,
                    enemy,
                    &Contact {
                        kind: ContactKind::Projectile,
                        base: shot_base,
                    },
                    CollisionKind::Normal,
                );
                dispatch(
                    sector,
                    shot,
                    &Contact {
                        kind: ContactKind::Enemy,
                        base: enemy_base,
                    },
                    CollisionKind::Normal,
                );
                break;
            }
        }
    }

    // Enemies against each other, each unordered pair once. The later
    // registrant hears about it first.
    for i in 0..enemies.len() {
        for j in (i + 1)..enemies.len() {
            let Some((base_i, dying_i)) = enemy_state(sector, enemies[i]) else {
                continue;
            };
            let Some((base_j, dying_j)) = enemy_state(sector, enemies[j]) else {
                continue;
            };
            if dying_i != DyingState::Not || dying_j != DyingState::Not {
                continue;
            }
            if rect_collision(&base_i, &base_j) {
                dispatch(
                    sector,
                    enemies[j],
                    &Contact {
                        kind: ContactKind::Enemy,
                        base: base_i,
                    },
                    CollisionKind::Normal,
                );
                dispatch(
                    sector,
                    enemies[i],
                    &Contact {
                        kind: ContactKind::Enemy,
                        base: base_j,
                    },
                    CollisionKind::Normal,
                );
            }
        }
    }

    // A dying player collides with nothing.
    match player_view(sector) {
        Some(view) if view.dying == DyingState::Not => {}
        _ => return,
    }

    // Enemies against the player.
    for &enemy in &enemies {
        let Some(player) = player_view(sector) else {
            return;
        };
        let Some((enemy_base, dying)) = enemy_state(sector, enemy) else {
            continue;
        };
        if dying != DyingState::Not {
            continue;
        }
        if rect_collision_offset(&enemy_base, &player.base, 0.0, 0.0) {
            if descending_onto(&player.previous_base, &player.base, &enemy_base)
                && !player.invincible
            {
                dispatch(
                    sector,
                    enemy,
                    &Contact {
                        kind: ContactKind::Player,
                        base: player.base,
                    },
                    CollisionKind::Squish,
                );
            } else {
                dispatch(
                    sector,
                    sector.player_id,
                    &Contact {
                        kind: ContactKind::Enemy,
                        base: enemy_base,
                    },
                    CollisionKind::Normal,
                );
                dispatch(
                    sector,
                    enemy,
                    &Contact {
                        kind: ContactKind::Player,
                        base: player.base,
                    },
                    CollisionKind::Normal,
                );
            }
        }
    }

    // Power-ups against the player. The power-up applies itself.
    let power_ups: Vec<ObjectId> = sector.registry.index(TrackedKind::PowerUp).to_vec();
    for &power_up in &power_ups {
        let Some(player) = player_view(sector) else {
            return;
        };
        let Some(base) = bounds_of(sector, power_up) else {
            continue;
        };
        if rect_collision(&base, &player.base) {
            dispatch(
                sector,
                power_up,
                &Contact {
                    kind: ContactKind::Player,
                    base: player.base,
                },
                CollisionKind::Normal,
            );
        }
    }

    // Trampolines against the player. A steep landing only compresses
    // the spring; falling or level contact springs the player and
    // pokes the spring; ascending contact does nothing.
    let trampolines: Vec<ObjectId> = sector.registry.index(TrackedKind::Trampoline).to_vec();
    for &trampoline in &trampolines {
        let Some(player) = player_view(sector) else {
            return;
        };
        let Some(base) = bounds_of(sector, trampoline) else {
            continue;
        };
        if rect_collision(&base, &player.base) {
            if descending_onto(&player.previous_base, &player.base, &base) {
                dispatch(
                    sector,
                    trampoline,
                    &Contact {
                        kind: ContactKind::Player,
                        base: player.base,
                    },
                    CollisionKind::Squish,
                );
            } else if player.previous_base.y <= player.base.y {
                dispatch(
                    sector,
                    sector.player_id,
                    &Contact {
                        kind: ContactKind::Trampoline,
                        base,
                    },
                    CollisionKind::Normal,
                );
                dispatch(
                    sector,
                    trampoline,
                    &Contact {
                        kind: ContactKind::Player,
                        base: player.base,
                    },
                    CollisionKind::Normal,
                );
            }
        }
    }

    // Flying platforms against the player. Landings only; contact from
    // below or the side does nothing.
    let platforms: Vec<ObjectId> = sector.registry.index(TrackedKind::FlyingPlatform).to_vec();
    for &platform in &platforms {
        let Some(player) = player_view(sector) else {
            return;
        };
        let Some(base) = bounds_of(sector, platform) else {
            continue;
        };
        if rect_collision(&base, &player.base)
            && descending_onto(&player.previous_base, &player.base, &base)
        {
            dispatch(
                sector,
                platform,
                &Contact {
                    kind: ContactKind::Player,
                    base: player.base,
                },
                CollisionKind::Squish,
            );
            dispatch(
                sector,
                sector.player_id,
                &Contact {
                    kind: ContactKind::FlyingPlatform,
                    base,
                },
                CollisionKind::Squish,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descent_requires_downward_motion() {
        let prev = Rectangle::new(0.0, 100.0, 32.0, 32.0);
        let curr = Rectangle::new(0.0, 96.0, 32.0, 32.0);
        let target = Rectangle::new(0.0, 128.0, 32.0, 32.0);

        // Moving upward never squishes, however the rectangles line up.
        assert!(!descending_onto(&prev, &curr, &target));
    }

    #[test]
    fn test_descent_requires_previous_bottom_above_target_midpoint() {
        let target = Rectangle::new(0.0, 128.0, 32.0, 32.0); // midpoint 144

        let from_above = Rectangle::new(0.0, 100.0, 32.0, 32.0); // bottom 132
        let curr = Rectangle::new(0.0, 110.0, 32.0, 32.0);
        assert!(descending_onto(&from_above, &curr, &target));

        let from_beside = Rectangle::new(0.0, 120.0, 32.0, 32.0); // bottom 152
        let curr = Rectangle::new(0.0, 124.0, 32.0, 32.0);
        assert!(!descending_onto(&from_beside, &curr, &target));
    }
}

//! Plain-text and JSON reports for the `proxima` subcommands.
//!
//! Every report writes to a caller-supplied writer so the binary can point
//! it at stdout and tests can capture it.

use std::io::Write;

use anyhow::Result;
use collision::{CollisionProxy, CollisionScene};
use scene::Scene;
use tracing::info;

/// Self-collision setting for a query: the scene's configured default
/// unless `--no-self` turned it off.
#[must_use]
pub fn self_collision(scene: &Scene, no_self: bool) -> bool {
    !no_self && scene.world().config().self_collision
}

/// Checks the initial state and then every step in order. Returns `true`
/// if all of them are collision free.
pub fn check(scene: &mut Scene, self_collision: bool, out: &mut impl Write) -> Result<bool> {
    let mut all_valid = write_validity(scene, "initial", self_collision, out)?;
    for step in 0..scene.step_count() {
        scene.apply_step(step)?;
        all_valid &= write_validity(scene, &format!("step {step}"), self_collision, out)?;
    }
    info!(steps = scene.step_count(), all_valid, "check finished");
    Ok(all_valid)
}

fn write_validity(scene: &Scene, label: &str, self_collision: bool, out: &mut impl Write) -> Result<bool> {
    match scene.world().first_collision(self_collision)? {
        None => {
            writeln!(out, "{label}: valid")?;
            Ok(true)
        }
        Some((a, b)) => {
            writeln!(out, "{label}: collision between {a} and {b}")?;
            Ok(false)
        }
    }
}

/// Every proxy of the current state, as a table or as a JSON array.
pub fn distances(scene: &Scene, self_collision: bool, json: bool, out: &mut impl Write) -> Result<()> {
    let proxies = scene.world().distances(self_collision)?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &proxies)?;
        writeln!(out)?;
        return Ok(());
    }

    for proxy in &proxies {
        write_proxy(proxy, out)?;
    }
    match proxies.iter().min_by(|x, y| x.distance.total_cmp(&y.distance)) {
        Some(closest) => writeln!(
            out,
            "{} pairs, closest {} / {} at {:.6}",
            proxies.len(),
            closest.name_a,
            closest.name_b,
            closest.distance
        )?,
        None => writeln!(out, "no candidate pairs")?,
    }
    Ok(())
}

/// The targeted result for one named pair.
pub fn pair(scene: &Scene, a: &str, b: &str, out: &mut impl Write) -> Result<()> {
    let proxy = scene.world().pair_distance(a, b)?;
    write_proxy(&proxy, out)
}

fn write_proxy(proxy: &CollisionProxy, out: &mut impl Write) -> Result<()> {
    let status = if proxy.is_colliding() { "colliding" } else { "clear" };
    writeln!(
        out,
        "{:<20} {:<20} {:>12.6}  {:<9} normal [{:.3}, {:.3}, {:.3}]",
        proxy.name_a, proxy.name_b, proxy.distance, status, proxy.normal.x, proxy.normal.y, proxy.normal.z
    )?;
    Ok(())
}

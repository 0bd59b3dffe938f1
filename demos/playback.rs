//! Loads the `Kani` entity from disk, previews every animation at a fixed
//! tick rate and prints the body bone's pose as it moves.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example playback
//! ```

use std::path::PathBuf;

use ink_animator::document::parse::animation_names;
use ink_animator::{Entity, FileDocumentReader, LoaderSettings, NullTexturePreloader};

const TICK: f32 = 1.0 / 30.0;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let reader = FileDocumentReader::new(&root);

    let mut entity = rt.block_on(Entity::load(&reader, "Kani", LoaderSettings::default()))?;
    let names = animation_names(entity.document());
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();

    rt.block_on(async {
        entity.preload_animations(&name_refs).await?;
        entity
            .preload_skins(&NullTexturePreloader, &["Skin_crab", "Skin_party"])
            .await
    })?;

    let Some(&body) = entity
        .bones()
        .iter()
        .find(|(_, node)| node.bone.name == "body")
        .map(|(_, node)| &node.bone.uuid)
    else {
        anyhow::bail!("Kani has no body bone");
    };

    for name in &names {
        entity.run_once(name)?;
        println!("== {name} ({} s)", entity.animation(name)?.duration());

        let mut frame = 0;
        while entity.is_playing() {
            entity.update(TICK);
            frame += 1;
            if let Some(pose) = entity.pose(&body)
                && frame % 5 == 0
            {
                println!(
                    "  frame {frame:>3}: position ({:>6.2}, {:>6.2}) rotation {:>5.2} alpha {:.2}",
                    pose.position.x, pose.position.y, pose.rotation, pose.alpha
                );
            }
        }
    }

    entity.set_skin("Skin_party")?;
    entity.run_forever("Idle")?;
    for _ in 0..15 {
        entity.update(TICK);
    }
    entity.stop();
    println!("Stopped in skin {:?}", entity.current_skin());

    Ok(())
}

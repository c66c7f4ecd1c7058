use anyhow::{Context, Result};
use std::path::Path;

use sangeet_core::{CompositionDraft, CompositionStore, FileStorage, SavedComposition};

fn open_store(storage_dir: &Path) -> Result<CompositionStore<FileStorage>> {
    let storage = FileStorage::open(storage_dir)
        .with_context(|| format!("Failed to open storage at {}", storage_dir.display()))?;
    Ok(CompositionStore::new(storage))
}

/// List every saved composition, newest first.
pub fn list(storage_dir: &Path, json: bool) -> Result<()> {
    let store = open_store(storage_dir)?;
    print_compositions(&store.get_all(), json)
}

/// Search saved compositions.
pub fn search(storage_dir: &Path, query: &str, json: bool) -> Result<()> {
    let store = open_store(storage_dir)?;
    print_compositions(&store.search(query), json)
}

/// Show one composition in full.
pub fn show(storage_dir: &Path, id: &str, json: bool) -> Result<()> {
    let store = open_store(storage_dir)?;
    let Some(composition) = store.get_by_id(id) else {
        anyhow::bail!("No saved composition with id {}", id);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&composition)?);
        return Ok(());
    }

    println!("{}", composition.title);
    println!("  id:          {}", composition.id);
    println!("  raga:        {}", composition.raga);
    println!("  tala:        {}", composition.tala);
    println!("  instruments: {}", composition.instruments.join(", "));
    println!("  tempo:       {} bpm", composition.tempo);
    println!("  mood:        {}", composition.mood);
    println!("  audio:       {}", composition.audio_url);
    if let Some(description) = &composition.description {
        println!("  description: {}", description);
    }
    println!("  created:     {}", composition.created_at.to_rfc3339());
    println!("  generated:   {}", composition.generated_at.to_rfc3339());

    Ok(())
}

/// Save a new composition.
pub fn save(storage_dir: &Path, draft: CompositionDraft) -> Result<()> {
    let mut store = open_store(storage_dir)?;
    let saved = store.save(draft).context("Failed to save composition")?;

    println!("✓ Saved '{}' as {}", saved.title, saved.id);
    Ok(())
}

/// Delete a composition by id.
pub fn delete(storage_dir: &Path, id: &str) -> Result<()> {
    let mut store = open_store(storage_dir)?;
    let existed = store.get_by_id(id).is_some();

    if !store.delete_by_id(id) {
        anyhow::bail!("Failed to write saved compositions to {}", storage_dir.display());
    }

    if existed {
        println!("✓ Deleted {}", id);
    } else {
        println!("Nothing to delete: no saved composition with id {}", id);
    }
    Ok(())
}

/// Remove every saved composition.
pub fn clear(storage_dir: &Path) -> Result<()> {
    let mut store = open_store(storage_dir)?;
    let count = store.count();

    if !store.clear() {
        anyhow::bail!("Failed to clear saved compositions in {}", storage_dir.display());
    }

    println!("✓ Removed {} saved composition(s)", count);
    Ok(())
}

fn print_compositions(compositions: &[SavedComposition], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(compositions)?);
        return Ok(());
    }

    if compositions.is_empty() {
        println!("No saved compositions.");
        return Ok(());
    }

    for composition in compositions {
        println!(
            "{}  {} (raga {}, tala {}, {} bpm, {})",
            composition.id,
            composition.title,
            composition.raga,
            composition.tala,
            composition.tempo,
            composition.mood
        );
    }
    println!("\n{} composition(s)", compositions.len());

    Ok(())
}

//! Show an analysis report.

use std::path::PathBuf;

use courtside_court_model::MatchReport;

pub fn run(path: PathBuf, json: bool) -> anyhow::Result<()> {
    let report =
        MatchReport::load(&path).map_err(|e| anyhow::anyhow!("Failed to load report: {e}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Session: {}", report.session_id);
    println!("  Created: {}", report.created_at);
    println!();

    let s = &report.source;
    println!("Source:");
    println!("  Path: {}", s.path);
    println!(
        "  Resolution: {}x{} @ {}fps, {} frames",
        s.width, s.height, s.fps, s.frame_count
    );
    println!();

    println!("Calibration: {}", report.calibration.mode);
    for p in report.calibration.corners.points() {
        println!("  ({:.1}, {:.1})", p.x, p.y);
    }
    println!();

    let seg = &report.segmentation;
    println!("Segmentation (threshold {}):", seg.threshold);
    for record in &seg.intervals {
        println!(
            "  frames {:>6} - {:<6} {:>8.2}s - {:<8.2}s ({:.2}s)",
            record.interval.start_frame,
            record.interval.end_frame,
            record.start_secs,
            record.end_secs,
            record.duration_secs
        );
    }
    println!(
        "  In play: {} frames ({:.1}s)",
        seg.action_frame_count,
        report.action_secs()
    );
    println!();

    println!("Bounces: {}", report.bounces.len());
    for b in &report.bounces {
        println!(
            "  frame {:>6}  screen ({:.1}, {:.1})  court ({:.2}m, {:.2}m)  canvas ({}, {})",
            b.source_frame, b.screen.x, b.screen.y, b.court.x, b.court.y, b.canvas.x, b.canvas.y
        );
    }

    Ok(())
}

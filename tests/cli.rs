//! CLI integration tests
//!
//! Runs the actual binary. The mock backend keeps every run model-free,
//! so these work on a clean checkout.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

#[cfg(test)]
mod tests {
    use super::*;

    fn cutout() -> Command {
        Command::cargo_bin("cutout").unwrap()
    }

    fn write_test_png(dir: &Path, name: &str) {
        let img = image::DynamicImage::ImageRgba8(image::ImageBuffer::from_pixel(
            8,
            8,
            image::Rgba([120, 40, 40, 255]),
        ));
        img.save_with_format(dir.join(name), image::ImageFormat::Png)
            .unwrap();
    }

    fn single_output_name(out_dir: &Path) -> String {
        let entries: Vec<_> = std::fs::read_dir(out_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries.len(), 1, "expected exactly one output file");
        entries.into_iter().next().unwrap()
    }

    // TC-CLI-001: Help lists the subcommands
    #[test]
    fn test_help_lists_subcommands() {
        cutout()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("remove"))
            .stdout(predicate::str::contains("info"));
    }

    // TC-CLI-002: Info runs without a model installed
    #[test]
    fn test_info_succeeds() {
        cutout()
            .arg("info")
            .assert()
            .success()
            .stdout(predicate::str::contains("cutout v"))
            .stdout(predicate::str::contains("Model Search Paths:"));
    }

    // TC-CLI-003: Missing input exits with the input-not-found code
    #[test]
    fn test_missing_input_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        cutout()
            .current_dir(dir.path())
            .args(["remove", "missing.png", "--backend", "mock"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("does not exist"));
    }

    // TC-CLI-004: Remove round trip with the mock backend
    #[test]
    fn test_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        write_test_png(dir.path(), "photo.png");

        cutout()
            .current_dir(dir.path())
            .args(["remove", "photo.png", "--backend", "mock", "-o", "out"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Saved: "));

        let name = single_output_name(&dir.path().join("out"));
        assert!(name.ends_with(".png"));
    }

    // TC-CLI-005: Invalid backend value rejected by clap
    #[test]
    fn test_invalid_backend_rejected() {
        cutout()
            .args(["remove", "photo.png", "--backend", "bogus"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value"));
    }

    // TC-CLI-006: No subcommand prints usage
    #[test]
    fn test_missing_subcommand() {
        cutout()
            .assert()
            .failure()
            .stderr(predicate::str::contains("Usage"));
    }

    // TC-CLI-007: Unresolvable model exits with the model-error code
    #[test]
    fn test_model_not_found_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        write_test_png(dir.path(), "photo.png");

        cutout()
            .current_dir(dir.path())
            .env_remove("CUTOUT_MODEL")
            .env("XDG_DATA_HOME", dir.path())
            .args(["remove", "photo.png", "--model", "nonexistent.onnx"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Model file not found"));
    }

    // TC-CLI-008: Slug naming keeps a sanitized stem
    #[test]
    fn test_slug_naming() {
        let dir = tempfile::tempdir().unwrap();
        write_test_png(dir.path(), "Holiday Photo.png");

        cutout()
            .current_dir(dir.path())
            .args([
                "remove",
                "Holiday Photo.png",
                "--backend",
                "mock",
                "-o",
                "out",
                "--naming",
                "slug",
            ])
            .assert()
            .success();

        let name = single_output_name(&dir.path().join("out"));
        assert!(name.starts_with("holiday_photo_"), "got {}", name);
        assert!(name.ends_with(".png"));
    }

    // TC-CLI-009: Local cutout.toml is picked up from the working directory
    #[test]
    fn test_local_config_file() {
        let dir = tempfile::tempdir().unwrap();
        write_test_png(dir.path(), "photo.png");
        std::fs::write(
            dir.path().join("cutout.toml"),
            "[output]\ndir = \"from_config\"\n\n[model]\nbackend = \"mock\"\n",
        )
        .unwrap();

        cutout()
            .current_dir(dir.path())
            .args(["remove", "photo.png"])
            .assert()
            .success();

        let name = single_output_name(&dir.path().join("from_config"));
        assert!(name.ends_with(".png"));
    }

    // TC-CLI-010: Verbose output reports size and timing
    #[test]
    fn test_verbose_output() {
        let dir = tempfile::tempdir().unwrap();
        write_test_png(dir.path(), "photo.png");

        cutout()
            .current_dir(dir.path())
            .args(["remove", "photo.png", "--backend", "mock", "-o", "out", "-v"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Size: 8x8"))
            .stdout(predicate::str::contains("Time: "));
    }
}

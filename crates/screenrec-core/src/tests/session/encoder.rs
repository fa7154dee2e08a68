use crate::{
    CaptureSettings, EncoderKind, EncoderLauncher, EncoderLocator, Framerate, Quality, Resolution,
};

use std::{fs, path::Path, path::PathBuf};

use tempfile::TempDir;

fn locator_for(bin: &Path) -> EncoderLocator {
    EncoderLocator {
        companion_bin: Some(bin.to_path_buf()),
        path_program: None,
        fallbacks: Vec::new(),
    }
}

fn empty_locator() -> EncoderLocator {
    EncoderLocator {
        companion_bin: None,
        path_program: None,
        fallbacks: Vec::new(),
    }
}

fn settings_with(encoder: EncoderKind) -> CaptureSettings {
    CaptureSettings {
        resolution: Resolution::Hd720,
        framerate: Framerate::Fps25,
        quality: Quality::Medium,
        encoder,
        debug_log: false,
    }
}

#[allow(clippy::unwrap_used)]
fn launcher_with(temp: &TempDir, settings: CaptureSettings) -> EncoderLauncher {
    let bin = temp.path().join("ffmpeg");
    fs::write(&bin, b"fake").unwrap();
    EncoderLauncher::new(settings, temp.path().join("encoder.log")).with_locator(locator_for(&bin))
}

#[allow(clippy::unwrap_used)]
fn executable_stub(temp: &TempDir, name: &str, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = temp.path().join(name);
    fs::write(&path, script).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// WHAT: The VP9 backend forces a .webm output extension
/// WHY: The container must match the codec family
#[test]
#[allow(clippy::unwrap_used)]
fn given_vp9_encoder_when_building_command_then_webm_extension() {
    // Given: A launcher configured for VP9
    let temp = TempDir::new().unwrap();
    let launcher = launcher_with(&temp, settings_with(EncoderKind::Vp9));

    // When: Building a command for an .mp4 suggestion
    let invocation = launcher
        .build_command(&temp.path().join("clip.mp4"))
        .unwrap();

    // Then: Output is .webm and the VP9 flag set is present
    assert_eq!(invocation.output_path.extension().unwrap(), "webm");
    assert!(invocation.args.iter().any(|a| a == "libvpx-vp9"));
    assert!(invocation.args.iter().any(|a| a == "40"));
}

/// WHAT: The software H.264 backend forces a .mp4 output extension
/// WHY: The container must match the codec family
#[test]
#[allow(clippy::unwrap_used)]
fn given_x264_encoder_when_building_command_then_mp4_extension() {
    // Given: A launcher configured for x264
    let temp = TempDir::new().unwrap();
    let launcher = launcher_with(&temp, settings_with(EncoderKind::X264));

    // When: Building a command for a .webm suggestion
    let invocation = launcher
        .build_command(&temp.path().join("clip.webm"))
        .unwrap();

    // Then: Output is .mp4 with the fixed x264 flag set
    assert_eq!(invocation.output_path.extension().unwrap(), "mp4");
    assert!(invocation.args.iter().any(|a| a == "libx264"));
    assert!(invocation.args.iter().any(|a| a == "zerolatency"));
}

/// WHAT: The hardware H.264 backend forces a .mp4 output extension
/// WHY: The container must match the codec family
#[test]
#[allow(clippy::unwrap_used)]
fn given_v4l2m2m_encoder_when_building_command_then_mp4_extension() {
    // Given: A launcher configured for the V4L2 backend
    let temp = TempDir::new().unwrap();
    let launcher = launcher_with(&temp, settings_with(EncoderKind::V4l2m2m));

    // When: Building a command
    let invocation = launcher
        .build_command(&temp.path().join("clip.webm"))
        .unwrap();

    // Then: Output is .mp4 with the hardware codec selected
    assert_eq!(invocation.output_path.extension().unwrap(), "mp4");
    assert!(invocation.args.iter().any(|a| a == "h264_v4l2m2m"));
}

/// WHAT: The framebuffer source and scale filter are always present
/// WHY: The capture source is fixed; only the scaling varies with settings
#[test]
#[allow(clippy::unwrap_used)]
fn given_default_settings_when_building_command_then_fixed_capture_shape() {
    // Given: A launcher with 720p at 25fps
    let temp = TempDir::new().unwrap();
    let launcher = launcher_with(&temp, settings_with(EncoderKind::X264));

    // When: Building a command
    let invocation = launcher
        .build_command(&temp.path().join("clip.mp4"))
        .unwrap();

    // Then: fbdev input, framerate, and scale filter are in place
    assert!(invocation.args.iter().any(|a| a == "/dev/fb0"));
    assert!(invocation.args.iter().any(|a| a == "25"));
    assert!(
        invocation
            .args
            .iter()
            .any(|a| a == "scale=1280:720:flags=bicubic,format=yuv420p")
    );
    assert_eq!(
        invocation.args.last().map(String::as_str),
        invocation.output_path.to_str()
    );
}

/// WHAT: Debug logging elevates the encoder's own verbosity
/// WHY: Encoder diagnostics follow the app's debug flag
#[test]
#[allow(clippy::unwrap_used)]
fn given_debug_logging_when_building_command_then_verbose_loglevel() {
    // Given: Settings with the debug flag raised
    let temp = TempDir::new().unwrap();
    let mut settings = settings_with(EncoderKind::X264);
    settings.debug_log = true;
    let launcher = launcher_with(&temp, settings);

    // When: Building a command
    let invocation = launcher
        .build_command(&temp.path().join("clip.mp4"))
        .unwrap();

    // Then: Verbose loglevel plus periodic stats
    assert_eq!(invocation.args[0], "-loglevel");
    assert_eq!(invocation.args[1], "info");
    assert_eq!(invocation.args[2], "-stats");
}

/// WHAT: No encoder anywhere means no command
/// WHY: Callers surface a missing-dependency error instead of spawning
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_encoder_available_when_building_command_then_none() {
    // Given: A launcher with nowhere to find a binary
    let temp = TempDir::new().unwrap();
    let launcher = EncoderLauncher::new(
        settings_with(EncoderKind::X264),
        temp.path().join("encoder.log"),
    )
    .with_locator(empty_locator());

    // When/Then: Command construction yields nothing
    assert!(launcher.build_command(&temp.path().join("clip.mp4")).is_none());
}

/// WHAT: The companion binary is trusted on existence alone
/// WHY: The bundled tools package is the preferred, pre-validated source
#[test]
#[allow(clippy::unwrap_used)]
fn given_companion_binary_present_when_locating_then_returned_without_validation() {
    // Given: A companion path that exists but is not even executable
    let temp = TempDir::new().unwrap();
    let bin = temp.path().join("ffmpeg");
    fs::write(&bin, b"not really ffmpeg").unwrap();

    // When: Locating
    let found = locator_for(&bin).locate();

    // Then: The companion hit is returned as-is
    assert_eq!(found, Some(bin));
}

/// WHAT: Fallback candidates failing the version probe are rejected
/// WHY: Stale absolute paths must not be handed to the spawner
#[test]
#[allow(clippy::unwrap_used)]
fn given_fallback_candidate_failing_version_probe_when_locating_then_rejected() {
    // Given: A fallback binary whose version query exits nonzero
    let temp = TempDir::new().unwrap();
    let bad = executable_stub(&temp, "ffmpeg-bad", "#!/bin/sh\nexit 1\n");
    let locator = EncoderLocator {
        companion_bin: None,
        path_program: None,
        fallbacks: vec![bad],
    };

    // When/Then: Nothing usable is found
    assert_eq!(locator.locate(), None);
}

/// WHAT: A fallback candidate answering the version probe is accepted
/// WHY: Validation gates fallbacks on a real, working binary
#[test]
#[allow(clippy::unwrap_used)]
fn given_fallback_candidate_passing_version_probe_when_locating_then_accepted() {
    // Given: A fallback binary that answers the version query cleanly
    let temp = TempDir::new().unwrap();
    let good = executable_stub(&temp, "ffmpeg-good", "#!/bin/sh\nexit 0\n");
    let locator = EncoderLocator {
        companion_bin: None,
        path_program: None,
        fallbacks: vec![good.clone()],
    };

    // When/Then: The validated candidate is returned
    assert_eq!(locator.locate(), Some(good));
}

//! End-to-end scenario: a data track containing a raw Mode 1 sector is rejected outright
//! rather than silently reinterpreted, and no partial output is left behind.

mod common;

use eboot2cue::{Config, CoreError};

#[test]
fn mode1_sector_aborts_extraction_without_writing_output() {
    let mut sectors = common::plain_form1_sectors(4);
    sectors[2] = common::raw_mode1_sector();

    let mut fixture = common::DiscFixture::new("SLUS_00003", "MODE1 TEST DISC");
    fixture.iso_blocks = common::blocks_from_sectors(&sectors);
    fixture.cue_entries = vec![
        common::RawCue::data(1, (0x00, 0x00, 0x00)),
        common::RawCue::lead_out((0x00, 0x00, 0x04)),
    ];

    let pbp = common::single_disc_pbp(&fixture);
    let (mut ctx, out_dir) = common::test_ctx();
    let config = Config::new("<memory>", out_dir.clone());

    let result = eboot2cue::pipeline::run(&pbp, &config, &mut ctx);
    assert!(matches!(result, Err(CoreError::UnsupportedMode(_))), "got {:?}", result);

    assert!(!out_dir.join("CDROM.BIN").exists());
    assert!(!out_dir.join("CDROM.CUE").exists());

    std::fs::remove_dir_all(&out_dir).ok();
}

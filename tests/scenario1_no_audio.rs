//! End-to-end scenario: a single disc with no audio tracks at all.

mod common;

use eboot2cue::Config;

#[test]
fn single_disc_no_audio_produces_a_plain_data_track() {
    let mut fixture = common::DiscFixture::new("SLUS_00000", "TEST DISC");
    fixture.iso_blocks = common::blocks_from_sectors(&common::plain_form1_sectors(10));
    fixture.cue_entries = vec![
        common::RawCue::data(1, (0x00, 0x00, 0x00)),
        common::RawCue::lead_out((0x00, 0x00, 0x10)),
    ];

    let pbp = common::single_disc_pbp(&fixture);
    let (mut ctx, out_dir) = common::test_ctx();
    let config = Config::new("<memory>", out_dir.clone());

    let summary = eboot2cue::pipeline::run(&pbp, &config, &mut ctx).unwrap();

    assert_eq!(summary.discs.len(), 1);
    let disc = &summary.discs[0];
    assert_eq!(disc.sector_counts.total(), 10);
    assert_eq!(disc.sector_counts.mode2_form1, 10);
    assert_eq!(disc.audio_tracks_recovered, 0);

    let bin = std::fs::read(&disc.bin_path).unwrap();
    assert_eq!(bin.len(), 10 * eboot2cue::SECTOR_SIZE);

    let cue = std::fs::read_to_string(&disc.cue_path).unwrap();
    assert!(cue.contains("TRACK 01 MODE2/2352"));
    assert!(cue.contains("INDEX 01 00:00:00"));

    std::fs::remove_dir_all(&out_dir).ok();
}

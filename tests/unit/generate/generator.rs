use super::*;
use crate::config::model::GenerationConfigDef;
use crate::foundation::core::Canvas;
use crate::foundation::error::ReelError;

fn config() -> Arc<GenerationConfig> {
    Arc::new(
        GenerationConfig::new(GenerationConfigDef {
            output_resolution: Canvas {
                width: 40,
                height: 64,
            },
            fps: 10,
            target_duration: 2.0,
            base_clip_duration: 0.6,
            ..GenerationConfigDef::default()
        })
        .unwrap(),
    )
}

struct SolidSource {
    canvas: Canvas,
}

impl FrameSource for SolidSource {
    fn frame(&self, index: u64, _total: u64) -> ReelResult<Frame> {
        Ok(Frame::filled(self.canvas, [index as u8 * 10, 0, 0]))
    }

    fn name(&self) -> &str {
        "solid"
    }
}

#[test]
fn base_clip_has_exactly_base_frames() {
    let cfg = config();
    let generator = VideoGenerator::new(cfg.clone());
    let clip = generator.generate_base_clip().unwrap();
    assert_eq!(clip.len() as u64, cfg.base_frames());
    assert_eq!(clip.len(), 6);
    for (i, frame) in clip.iter().enumerate() {
        assert_eq!(frame.shape(), (64, 40, 3));
        assert_eq!(
            frame,
            &generator.generate_abstract_frame(i as u64, 6).unwrap()
        );
    }
    assert_eq!(generator.source_name(), "abstract-pattern");
}

#[test]
fn plugged_source_is_used_in_order() {
    let cfg = config();
    let generator = VideoGenerator::with_source(
        cfg.clone(),
        Box::new(SolidSource {
            canvas: cfg.canvas(),
        }),
    );
    let clip = generator.generate_base_clip().unwrap();
    let reds: Vec<u8> = clip.iter().map(|f| f.pixel(0, 0)[0]).collect();
    assert_eq!(reds, vec![0, 10, 20, 30, 40, 50]);
    assert_eq!(generator.source_name(), "solid");
}

#[test]
fn wrong_sized_source_frames_are_rejected() {
    let generator = VideoGenerator::with_source(
        config(),
        Box::new(SolidSource {
            canvas: Canvas {
                width: 39,
                height: 64,
            },
        }),
    );
    assert!(matches!(
        generator.generate_base_clip(),
        Err(ReelError::Shape(_))
    ));
}

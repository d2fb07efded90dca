use super::*;
use crate::config::model::GenerationConfigDef;
use crate::encode::sink::{DigestSink, InMemorySink};
use crate::foundation::core::Canvas;
use crate::pipeline::observer::CountingObserver;

const CANVAS: Canvas = Canvas {
    width: 64,
    height: 96,
};

/// 20 output frames over a 5-frame base clip; minor breaks every 4, major every 8.
fn small_config() -> GenerationConfig {
    GenerationConfig::new(GenerationConfigDef {
        output_resolution: CANVAS,
        fps: 10,
        target_duration: 2.0,
        base_clip_duration: 0.5,
        minor_break_interval: 4,
        major_break_interval: 8,
        ..GenerationConfigDef::default()
    })
    .unwrap()
}

fn pipeline() -> VideoPipeline {
    VideoPipeline::new(small_config()).unwrap()
}

struct FailingSink {
    fail_at: u64,
    pushed: u64,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> ReelResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &Frame) -> ReelResult<()> {
        if idx.0 == self.fail_at {
            return Err(ReelError::encode("disk full"));
        }
        self.pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        Ok(())
    }
}

/// Cancels `token` right after frame `at` has been pushed.
struct CancellingSink {
    token: CancelToken,
    at: u64,
    pushed: Vec<u64>,
}

impl FrameSink for CancellingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> ReelResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &Frame) -> ReelResult<()> {
        self.pushed.push(idx.0);
        if idx.0 == self.at {
            self.token.cancel();
        }
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        Ok(())
    }
}

#[test]
fn tiling_and_progress() {
    assert_eq!(tile_index(0, 5), 0);
    assert_eq!(tile_index(7, 5), 2);
    assert_eq!(tile_index(19, 5), 4);
    assert_eq!(tile_index(3, 0), 0);

    assert_eq!(progress_for(0, 20), 0.0);
    assert_eq!(progress_for(19, 20), 1.0);
    assert!((progress_for(10, 21) - 0.5).abs() < 1e-12);
    assert_eq!(progress_for(0, 1), 0.0);
}

#[test]
fn run_emits_every_frame_in_order() {
    let mut p = pipeline();
    assert_eq!(p.state(), PipelineState::Initialized);

    let mut sink = InMemorySink::new();
    let stats = p.run(&mut sink, &RunOpts::default()).unwrap();

    assert_eq!(p.state(), PipelineState::Finalized);
    assert!(sink.is_finished());
    assert_eq!(
        sink.config(),
        Some(&SinkConfig {
            width: 64,
            height: 96,
            fps: 10,
            total_frames: 20,
        })
    );
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, (0..20).collect::<Vec<_>>());
    for (_, frame) in sink.frames() {
        assert_eq!(frame.shape(), (96, 64, 3));
    }

    assert_eq!(
        stats,
        RenderStats {
            frames_total: 20,
            frames_emitted: 20,
            // 4 and 12
            minor_breaks: 2,
            // 8 and 16
            major_breaks: 2,
            base_frames: 5,
        }
    );
}

#[test]
fn compose_and_render_frame_match_run_output() {
    let mut p = pipeline();
    let mut sink = InMemorySink::new();
    p.run(&mut sink, &RunOpts::default()).unwrap();

    let clip = p.generator().generate_base_clip().unwrap();
    for i in [0u64, 4, 8, 13, 19] {
        let expected = &sink.frames()[i as usize].1;
        assert_eq!(&p.compose_frame(&clip, i).unwrap(), expected, "frame {i}");
        assert_eq!(&p.render_frame(i).unwrap(), expected, "frame {i}");
    }
}

#[test]
fn parallel_output_matches_sequential() {
    let mut seq = InMemorySink::new();
    pipeline().run(&mut seq, &RunOpts::default()).unwrap();

    let mut par = InMemorySink::new();
    let opts = RunOpts {
        parallel: true,
        threads: Some(3),
        chunk_size: 3,
        channel_capacity: 1,
        cancel: None,
    };
    let stats = pipeline().run(&mut par, &opts).unwrap();

    assert_eq!(stats.frames_emitted, 20);
    assert_eq!(seq.frames(), par.frames());
}

#[test]
fn repeated_runs_are_identical() {
    let mut p = pipeline();
    let mut a = DigestSink::new();
    let mut b = DigestSink::new();
    p.run(&mut a, &RunOpts::default()).unwrap();
    p.run(&mut b, &RunOpts::default()).unwrap();
    assert_eq!(a.digest(), b.digest());
    assert_eq!(p.state(), PipelineState::Finalized);
}

#[test]
fn captions_change_the_frames_they_cover() {
    let mut plain = pipeline();
    let mut captioned = pipeline();
    captioned.add_caption("Watch this", 0);
    assert_eq!(captioned.overlay().captions().len(), 1);

    // Caption lasts 25 frames at 10 fps, so it covers the whole run.
    assert_ne!(
        plain.render_frame(3).unwrap(),
        captioned.render_frame(3).unwrap()
    );

    let mut a = DigestSink::new();
    let mut b = DigestSink::new();
    plain.run(&mut a, &RunOpts::default()).unwrap();
    captioned.run(&mut b, &RunOpts::default()).unwrap();
    assert_ne!(a.digest(), b.digest());
}

#[test]
fn observer_sees_states_and_frames() {
    let obs = Arc::new(CountingObserver::new());
    let mut p = pipeline().with_observer(obs.clone());
    p.run(&mut InMemorySink::new(), &RunOpts::default()).unwrap();

    assert_eq!(
        obs.states(),
        vec![
            PipelineState::Generating,
            PipelineState::Compositing,
            PipelineState::Finalized
        ]
    );
    assert_eq!(obs.frames(), 20);
    assert_eq!(obs.minor_breaks(), 2);
    assert_eq!(obs.major_breaks(), 2);
    assert_eq!(obs.last_frame(), Some(FrameIndex(19)));
}

#[test]
fn sink_failure_aborts_the_run() {
    let obs = Arc::new(CountingObserver::new());
    let mut p = pipeline().with_observer(obs.clone());
    let mut sink = FailingSink {
        fail_at: 6,
        pushed: 0,
    };
    let err = p.run(&mut sink, &RunOpts::default()).unwrap_err();

    assert!(matches!(err, ReelError::Encode(_)));
    assert!(err.to_string().contains("disk full"), "{err}");
    assert_eq!(sink.pushed, 6);
    assert_eq!(p.state(), PipelineState::Aborted);
    assert_eq!(obs.states().last(), Some(&PipelineState::Aborted));
}

#[test]
fn sink_failure_aborts_a_parallel_run() {
    let mut p = pipeline();
    let mut sink = FailingSink {
        fail_at: 11,
        pushed: 0,
    };
    let opts = RunOpts {
        parallel: true,
        threads: Some(2),
        chunk_size: 4,
        ..RunOpts::default()
    };
    let err = p.run(&mut sink, &opts).unwrap_err();
    assert!(matches!(err, ReelError::Encode(_)));
    assert!(err.to_string().contains("disk full"), "{err}");
    assert_eq!(sink.pushed, 11);
    assert_eq!(p.state(), PipelineState::Aborted);
}

#[test]
fn pre_cancelled_run_emits_nothing() {
    let token = CancelToken::new();
    token.cancel();
    for parallel in [false, true] {
        let mut p = pipeline();
        let mut sink = InMemorySink::new();
        let opts = RunOpts {
            parallel,
            cancel: Some(token.clone()),
            ..RunOpts::default()
        };
        let err = p.run(&mut sink, &opts).unwrap_err();
        assert!(matches!(err, ReelError::Cancelled));
        assert!(sink.frames().is_empty());
        assert!(sink.config().is_none());
        assert_eq!(p.state(), PipelineState::Aborted);
    }
}

#[test]
fn cancellation_stops_at_the_next_frame() {
    let token = CancelToken::new();
    let mut sink = CancellingSink {
        token: token.clone(),
        at: 2,
        pushed: Vec::new(),
    };
    let opts = RunOpts {
        cancel: Some(token),
        ..RunOpts::default()
    };
    let err = pipeline().run(&mut sink, &opts).unwrap_err();
    assert!(matches!(err, ReelError::Cancelled));
    assert_eq!(sink.pushed, vec![0, 1, 2]);
}

#[test]
fn frame_index_out_of_range_is_rejected() {
    let p = pipeline();
    assert!(matches!(p.render_frame(20), Err(ReelError::Config(_))));
    let clip = p.generator().generate_base_clip().unwrap();
    assert!(matches!(
        p.compose_frame(&clip, 20),
        Err(ReelError::Config(_))
    ));
}

#[test]
fn bad_base_clips_are_shape_errors() {
    let p = pipeline();
    assert!(matches!(p.compose_frame(&[], 0), Err(ReelError::Shape(_))));

    let wrong = vec![Frame::filled(
        Canvas {
            width: 32,
            height: 96,
        },
        [0, 0, 0],
    )];
    let err = p.compose_frame(&wrong, 0).unwrap_err();
    assert!(matches!(err, ReelError::Shape(_)));
    assert!(err.to_string().contains("tile"));
}

#[test]
fn zero_threads_is_rejected() {
    let mut p = pipeline();
    let opts = RunOpts {
        parallel: true,
        threads: Some(0),
        ..RunOpts::default()
    };
    assert!(matches!(
        p.run(&mut InMemorySink::new(), &opts),
        Err(ReelError::Config(_))
    ));
}

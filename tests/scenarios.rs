use std::cell::RefCell;
use std::rc::Rc;

use elevator::headless::{HostEvent, Page};
use elevator::host::Document;
use elevator::sim::{self, Scenario};
use elevator::{Elevator, FrameOutcome, Options, Outcome};

fn options(json: &str) -> Options {
    Options::from_json(json).expect("options should parse")
}

fn ride(json: &str, scenario: Scenario) -> sim::Trace {
    sim::simulate(&options(json), &scenario).expect("simulation should run")
}

fn three_floors() -> Vec<f64> {
    vec![0.0, 500.0, 1200.0]
}

#[test]
fn ride_to_first_floor_takes_750ms_and_chimes() {
    let trace = ride(
        r#"{ "floors": 3, "mainAudio": true, "endAudio": true }"#,
        Scenario {
            floor_offsets: three_floors(),
            floor: "1".to_string(),
            ..Scenario::default()
        },
    );

    assert_eq!(trace.duration_ms, 750.0);
    assert_eq!(trace.final_position, 500.0);
    assert_eq!(
        trace.outcome,
        Some(Outcome::Arrived {
            floor: "1".to_string()
        })
    );

    let (last, earlier) = trace.frames.split_last().expect("at least one frame");
    assert!(last.elapsed_ms >= 750.0);
    assert!(earlier.iter().all(|f| f.elapsed_ms < 750.0));
    assert!(trace.frames.windows(2).all(|w| w[1].position >= w[0].position));

    assert_eq!(
        trace.audio,
        vec![
            "play audio/elevator.mp3",
            "pause audio/elevator.mp3",
            "rewind audio/elevator.mp3",
            "play audio/ding.mp3",
            "play audio/floor1.mp3",
        ]
    );
}

#[test]
fn end_hook_fires_once_on_arrival() {
    let page = sim::building(&Options::default(), &three_floors());
    let mut elevator = Elevator::new(page, &options(r#"{ "floors": 3 }"#)).unwrap();
    let ended = Rc::new(RefCell::new(Vec::new()));
    let log = ended.clone();
    elevator.on_end(move |floor| log.borrow_mut().push(floor.to_string()));

    let completion = elevator.click("button-2").unwrap();
    let mut now = 0.0;
    let mut arrivals = 0;
    while elevator.host_mut().take_frame().is_some() {
        if let FrameOutcome::Arrived(_) = elevator.frame(now) {
            arrivals += 1;
        }
        now += 16.0;
    }

    assert_eq!(arrivals, 1);
    assert_eq!(*ended.borrow(), vec!["2"]);
    assert!(completion.outcome().unwrap().arrived());
    assert_eq!(elevator.host().scroll_y(), 1200.0);
}

#[test]
fn fixed_duration_ignores_distance() {
    for floor in ["1", "2"] {
        let trace = ride(
            r#"{ "floors": 3, "duration": 2000 }"#,
            Scenario {
                floor_offsets: three_floors(),
                floor: floor.to_string(),
                ..Scenario::default()
            },
        );
        assert_eq!(trace.duration_ms, 2000.0);
        let last = trace.frames.last().unwrap();
        assert!(last.elapsed_ms >= 2000.0, "floor {floor}");
        let before = &trace.frames[trace.frames.len() - 2];
        assert!(before.elapsed_ms < 2000.0, "floor {floor}");
    }
}

#[test]
fn zero_distance_is_a_single_frame() {
    let mut page = sim::building(&Options::default(), &three_floors());
    page.set_scroll(500.0);
    let mut elevator = Elevator::new(page, &Options::default()).unwrap();

    elevator.click("button-1").unwrap();
    elevator.host_mut().clear_events();
    elevator.host_mut().take_frame();
    let outcome = elevator.frame(123.0);

    assert!(matches!(outcome, FrameOutcome::Arrived(_)));
    assert_eq!(elevator.host().pending_frame(), None);
    assert_eq!(elevator.host().scroll_trace(), vec![500.0]);
}

#[test]
fn blur_mid_ride_snaps_and_stays_quiet() {
    let trace = ride(
        r#"{ "floors": 3, "mainAudio": true, "endAudio": true }"#,
        Scenario {
            floor_offsets: three_floors(),
            floor: "2".to_string(),
            blur_after_ms: Some(300.0),
            ..Scenario::default()
        },
    );

    assert_eq!(
        trace.outcome,
        Some(Outcome::Interrupted {
            floor: "2".to_string()
        })
    );
    assert_eq!(trace.final_position, 1200.0);
    assert!(trace.frames.iter().all(|f| f.position < 1200.0));
    assert_eq!(
        trace.audio,
        vec![
            "play audio/elevator.mp3",
            "pause audio/elevator.mp3",
            "rewind audio/elevator.mp3",
        ]
    );
}

#[test]
fn blur_cancels_pending_frame_and_skips_end_hook() {
    let page = sim::building(&Options::default(), &three_floors());
    let mut elevator = Elevator::new(page, &options(r#"{ "mainAudio": true }"#)).unwrap();
    let ended = Rc::new(RefCell::new(false));
    let flag = ended.clone();
    elevator.on_end(move |_| *flag.borrow_mut() = true);

    elevator.click("button-2").unwrap();
    elevator.host_mut().take_frame();
    elevator.frame(0.0);
    let pending = elevator.host().pending_frame().unwrap();

    elevator.blur();
    assert!(elevator
        .host()
        .events()
        .contains(&HostEvent::FrameCancelled(pending)));
    assert_eq!(elevator.host().pending_frame(), None);
    assert!(!*ended.borrow());
    assert!(!elevator.is_animating());

    // The ride can start again right away.
    assert!(elevator.click("button-0").is_some());
}

#[test]
fn second_click_while_moving_schedules_nothing() {
    let page = sim::building(&Options::default(), &three_floors());
    let mut elevator = Elevator::new(page, &Options::default()).unwrap();

    elevator.click("button-2").unwrap();
    let requested = elevator.host().frames_requested();
    assert!(elevator.click("button-1").is_none());
    assert_eq!(elevator.host().frames_requested(), requested);
    assert_eq!(elevator.driver().run().unwrap().end_position, 1200.0);
}

#[test]
fn nested_target_offsets_are_summed() {
    let mut page = Page::new();
    let section = page.add_element("section", 30.0, None);
    let wrapper = page.add_element("", 20.0, Some(section));
    page.add_element("floor-0", 10.0, Some(wrapper));
    page.add_element("button-0", 0.0, None);
    let mut elevator = Elevator::new(page, &Options::default()).unwrap();

    elevator.click("button-0").unwrap();
    assert_eq!(elevator.driver().run().unwrap().end_position, 60.0);
    assert_eq!(elevator.driver().run().unwrap().duration_ms, 90.0);
}

#[test]
fn widgets_do_not_share_state() {
    let mut a = Elevator::new(
        sim::building(&Options::default(), &three_floors()),
        &Options::default(),
    )
    .unwrap();
    let mut b = Elevator::new(
        sim::building(&Options::default(), &three_floors()),
        &Options::default(),
    )
    .unwrap();

    a.click("button-2").unwrap();
    assert!(a.is_animating());
    assert!(!b.is_animating());
    assert!(b.click("button-1").is_some());
    assert!(b.blur().is_some());
    assert!(a.is_animating());
}

#[test]
fn custom_prefixes() {
    let opts = options(r#"{ "floors": 2, "triggerPrefix": "go-", "targetPrefix": "level-" }"#);
    let page = sim::building(&opts, &[0.0, 320.0]);
    let mut elevator = Elevator::new(page, &opts).unwrap();

    let floors: Vec<_> = elevator.bindings().into_iter().map(|b| b.trigger_id).collect();
    assert_eq!(floors, vec!["go-0", "go-1"]);
    elevator.click("go-1").unwrap();
    assert_eq!(elevator.driver().run().unwrap().end_position, 320.0);
}

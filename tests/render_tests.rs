//! Compositor integration tests — overlay priority, expiry, and frame
//! determinism against a scripted shared state.

#![cfg(not(target_os = "espidf"))]

use heartbadge::battery::{BatteryStateMachine, PowerVerdict};
use heartbadge::config::BadgeConfig;
use heartbadge::genome::{PatternBank, SOUND_REACTIVE_SLOT, VU_METER_SLOT};
use heartbadge::render::{
    effective_brightness, safety, Compositor, FrameBuffer, RenderMode, BRIGHTNESS_LEVELS,
};
use heartbadge::state::SharedState;
use heartbadge::LED_COUNT;

fn fixture() -> (Compositor, PatternBank, SharedState) {
    fastrand::seed(99);
    let config = BadgeConfig::default();
    (
        Compositor::new(&config),
        PatternBank::generate(),
        SharedState::new(),
    )
}

fn blank() -> FrameBuffer {
    [0; LED_COUNT * 3]
}

#[test]
fn compose_is_pure_for_fixed_inputs() {
    let (compositor, bank, shared) = fixture();
    shared.publish_battery(3800, false, false);
    shared.publish_sound(0.4, 0.6);

    let mut a = blank();
    let mut b = blank();
    let mode_a = compositor.compose(&mut a, &bank, &shared, 42, 10_000);
    let mode_b = compositor.compose(&mut b, &bank, &shared, 42, 10_000);
    assert_eq!(mode_a, mode_b);
    assert_eq!(a, b, "identical inputs must produce byte-identical frames");
}

#[test]
fn flash_preempts_every_other_mode() {
    let (compositor, bank, shared) = fixture();
    shared.publish_battery(3400, true, true); // safety forced
    shared.trigger_battery_meter(10_000);
    shared.trigger_firework(10_000);
    shared.trigger_flash(10_050);

    let mut frame = blank();
    let mode = compositor.compose(&mut frame, &bank, &shared, 0, 10_000);
    assert_eq!(mode, RenderMode::Flash);
    // Dim-white flash: every byte identical and non-zero.
    assert!(frame.iter().all(|&b| b == frame[0] && b > 0));
}

#[test]
fn safety_beats_battery_meter() {
    let (compositor, bank, shared) = fixture();
    shared.publish_battery(3400, true, true);
    shared.trigger_battery_meter(10_000);

    let mut frame = blank();
    let mode = compositor.compose(&mut frame, &bank, &shared, 30, 10_000);
    assert_eq!(mode, RenderMode::Safety);

    // The frame is the safety pattern's shape, not the gauge's.
    let mut expected = blank();
    safety::render(&mut expected, 30, effective_brightness(&shared));
    assert_eq!(frame, expected);
}

#[test]
fn battery_meter_beats_firework_and_patterns() {
    let (compositor, bank, shared) = fixture();
    shared.publish_battery(3900, false, false);
    shared.trigger_battery_meter(10_000);
    shared.trigger_firework(10_000);

    let mut frame = blank();
    let mode = compositor.compose(&mut frame, &bank, &shared, 0, 11_000);
    assert_eq!(mode, RenderMode::BatteryMeter);
}

#[test]
fn firework_renders_once_meter_expires() {
    let (compositor, bank, shared) = fixture();
    shared.publish_battery(3900, false, false);
    shared.trigger_battery_meter(10_000);
    shared.trigger_firework(14_000);

    // Meter total is fill (2 s) + hold (3 s); at +6 s it has expired.
    let mut frame = blank();
    let mode = compositor.compose(&mut frame, &bank, &shared, 0, 16_000);
    assert_eq!(mode, RenderMode::Firework);
    assert!(shared.battery_meter().is_none(), "expired meter must clear");
}

#[test]
fn overlays_expire_back_to_patterns() {
    let (compositor, bank, shared) = fixture();
    shared.publish_battery(3900, false, false);
    shared.trigger_battery_meter(10_000);
    shared.trigger_firework(10_000);

    let mut frame = blank();
    let mode = compositor.compose(&mut frame, &bank, &shared, 0, 60_000);
    assert_eq!(mode, RenderMode::Pattern);
    assert!(shared.battery_meter().is_none());
    assert!(shared.firework().is_none());
}

#[test]
fn pattern_slots_dispatch_to_their_renderers() {
    let (compositor, bank, shared) = fixture();
    shared.publish_battery(3900, false, false);
    shared.publish_sound(0.3, 0.5);
    let mut frame = blank();

    shared.set_pattern_index(VU_METER_SLOT as u8);
    assert_eq!(
        compositor.compose(&mut frame, &bank, &shared, 0, 10_000),
        RenderMode::VuMeter
    );

    shared.set_pattern_index(SOUND_REACTIVE_SLOT as u8);
    assert_eq!(
        compositor.compose(&mut frame, &bank, &shared, 0, 10_000),
        RenderMode::SoundReactive
    );

    shared.set_pattern_index(0);
    assert_eq!(
        compositor.compose(&mut frame, &bank, &shared, 0, 10_000),
        RenderMode::Pattern
    );
}

#[test]
fn limited_battery_forces_lowest_brightness() {
    let (_, _, shared) = fixture();
    shared.set_brightness_index(4);
    shared.publish_battery(3500, true, false);
    assert_eq!(effective_brightness(&shared), BRIGHTNESS_LEVELS[0]);

    shared.publish_battery(3800, false, false);
    assert_eq!(effective_brightness(&shared), BRIGHTNESS_LEVELS[4]);
}

#[test]
fn discharge_script_drives_render_modes() {
    let (compositor, bank, shared) = fixture();
    let mut supervisor = BatteryStateMachine::new(&BadgeConfig::default());
    let mut frame = blank();

    // Healthy cell: normal pattern.
    assert_eq!(supervisor.update(3600), PowerVerdict::Continue);
    shared.publish_battery(3600, supervisor.brightness_limited(), supervisor.safety_forced());
    assert_eq!(
        compositor.compose(&mut frame, &bank, &shared, 0, 10_000),
        RenderMode::Pattern
    );

    // Sagging: still the pattern, but at limited brightness.
    assert_eq!(supervisor.update(3500), PowerVerdict::Continue);
    shared.publish_battery(3500, supervisor.brightness_limited(), supervisor.safety_forced());
    assert_eq!(
        compositor.compose(&mut frame, &bank, &shared, 0, 10_000),
        RenderMode::Pattern
    );
    assert_eq!(effective_brightness(&shared), BRIGHTNESS_LEVELS[0]);

    // Critical: safety pattern takes the strip.
    assert_eq!(supervisor.update(3400), PowerVerdict::Continue);
    shared.publish_battery(3400, supervisor.brightness_limited(), supervisor.safety_forced());
    assert_eq!(
        compositor.compose(&mut frame, &bank, &shared, 0, 10_000),
        RenderMode::Safety
    );
}

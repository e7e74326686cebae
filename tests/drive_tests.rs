//! End-to-end tests for the drive pipeline.
//!
//! Raw mapping -> parser -> interactor -> motor driver + MQTT shadow report,
//! all on mocks.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use iotrain::gateways::{MotorDriverGateway, MqttShadowGateway};
use iotrain::hal::{MockMotorDriver, MockMqtt};
use iotrain::{
    Direction, Drive, FieldPolicy, Locomotive, OperateCommand, OperateInputPort, OperateInteractor,
    OperationError, SharedVehicle, Speed, StartInputPort, StartInteractor, Vehicle, VehicleContext,
};

const UPDATE_TOPIC: &str = "$aws/things/iotrain-01/shadow/update";

type ShadowInteractor<V> =
    OperateInteractor<Arc<SharedVehicle<V>>, MotorDriverGateway<MockMotorDriver>, MqttShadowGateway<MockMqtt>>;

fn drive_interactor() -> (ShadowInteractor<Drive>, Arc<SharedVehicle<Drive>>) {
    let context = Arc::new(SharedVehicle::new(Drive::new()));
    let interactor = OperateInteractor::new(
        Arc::clone(&context),
        MotorDriverGateway::new(MockMotorDriver::new()),
        MqttShadowGateway::new(MockMqtt::new(), "iotrain-01"),
    );
    (interactor, context)
}

fn parse(raw: Value, policy: FieldPolicy) -> iotrain::CommandResult {
    let map: Map<String, Value> = raw.as_object().cloned().unwrap_or_default();
    OperateCommand::from_map(&map, policy)
}

fn reports<V>(interactor: &ShadowInteractor<V>) -> Vec<Value>
where
    V: Vehicle,
{
    interactor
        .shadow()
        .client()
        .published_to(UPDATE_TOPIC)
        .iter()
        .map(|(_, payload, _)| serde_json::from_slice(payload).unwrap())
        .collect()
}

fn speed(v: i64) -> Speed {
    Speed::new(v).unwrap()
}

// ============================================================================
// Shadow path
// ============================================================================

#[test]
fn forward_command_drives_motor_and_reports() {
    let (mut interactor, context) = drive_interactor();

    let outcome = interactor
        .execute(parse(json!({"direction": "FORWARD", "speed": 10}), FieldPolicy::PartialUpdate))
        .unwrap();

    assert!(outcome.is_changed());
    assert_eq!(interactor.motor().driver().calls, vec![10]);
    assert_eq!(
        reports(&interactor),
        vec![json!({"state": {"reported": {"direction": "FORWARD", "speed": 10}}})]
    );
    assert_eq!(context.with_vehicle(|d| d.history().len()), 2);
}

#[test]
fn backward_is_negative() {
    let (mut interactor, _) = drive_interactor();
    interactor
        .execute(parse(json!({"direction": "BACKWARD", "speed": 35}), FieldPolicy::PartialUpdate))
        .unwrap();
    assert_eq!(interactor.motor().driver().speed, -35);
}

#[test]
fn stop_command_sends_zero() {
    let (mut interactor, _) = drive_interactor();
    interactor
        .execute(parse(json!({"direction": "FORWARD", "speed": 60}), FieldPolicy::PartialUpdate))
        .unwrap();
    interactor
        .execute(parse(json!({"direction": "STOP"}), FieldPolicy::PartialUpdate))
        .unwrap();

    assert_eq!(interactor.motor().driver().calls, vec![60, 0]);
    // Merged state is reported: the speed axis is carried over.
    assert_eq!(
        reports(&interactor)[1],
        json!({"state": {"reported": {"direction": "STOP", "speed": 60}}})
    );
}

#[test]
fn identical_command_twice_reaches_gateways_once() {
    let (mut interactor, context) = drive_interactor();
    let raw = json!({"direction": "FORWARD", "speed": 10});

    assert!(interactor.execute(parse(raw.clone(), FieldPolicy::PartialUpdate)).unwrap().is_changed());
    assert!(!interactor.execute(parse(raw, FieldPolicy::PartialUpdate)).unwrap().is_changed());

    assert_eq!(interactor.motor().driver().calls.len(), 1);
    assert_eq!(reports(&interactor).len(), 1);
    assert_eq!(context.with_vehicle(|d| d.history().len()), 2);
}

#[test]
fn unknown_direction_is_rejected_without_side_effects() {
    let (mut interactor, context) = drive_interactor();

    let err = interactor
        .execute(parse(json!({"direction": "SIDEWAYS"}), FieldPolicy::PartialUpdate))
        .unwrap_err();

    assert_eq!(
        err.validation_errors(),
        Some(&["direction must be STOP or FORWARD or BACKWARD".to_string()][..])
    );
    assert!(interactor.motor().driver().calls.is_empty());
    assert!(reports(&interactor).is_empty());
    assert_eq!(context.status().direction, Direction::Stop);
}

#[test]
fn out_of_range_speed_is_rejected() {
    let (mut interactor, _) = drive_interactor();

    let err = interactor
        .execute(parse(json!({"speed": 150}), FieldPolicy::PartialUpdate))
        .unwrap_err();

    assert_eq!(
        err.validation_errors(),
        Some(&["speed must be integer between 0 and 100".to_string()][..])
    );
    assert!(interactor.motor().driver().calls.is_empty());
}

#[test]
fn empty_partial_command_is_rejected() {
    let (mut interactor, _) = drive_interactor();

    let err = interactor.execute(parse(json!({}), FieldPolicy::PartialUpdate)).unwrap_err();

    assert_eq!(
        err.validation_errors(),
        Some(&["direction or speed must be specified".to_string()][..])
    );
}

#[test]
fn publish_failure_surfaces_after_motor_and_keeps_state() {
    let context = Arc::new(SharedVehicle::new(Drive::new()));
    let mut mqtt = MockMqtt::new();
    mqtt.connected = false;
    let mut interactor = OperateInteractor::new(
        Arc::clone(&context),
        MotorDriverGateway::new(MockMotorDriver::new()),
        MqttShadowGateway::new(mqtt, "iotrain-01"),
    );

    let err = interactor
        .execute(Ok(OperateCommand::new(Direction::Forward, speed(20))))
        .unwrap_err();

    assert!(matches!(err, OperationError::Gateway(_)));
    assert_eq!(interactor.motor().driver().calls, vec![20]);
    assert_eq!(context.status().speed, speed(20));
}

#[test]
fn motor_failure_skips_shadow() {
    let context = Arc::new(SharedVehicle::new(Locomotive::new()));
    let mut interactor = OperateInteractor::new(
        Arc::clone(&context),
        MotorDriverGateway::new(MockMotorDriver::failing()),
        MqttShadowGateway::new(MockMqtt::new(), "iotrain-01"),
    );

    let result = interactor.execute(Ok(OperateCommand::new(Direction::Backward, speed(5))));

    assert!(result.is_err());
    assert!(reports(&interactor).is_empty());
}

// ============================================================================
// Start
// ============================================================================

#[test]
fn start_reports_initial_state_once() {
    let context = Arc::new(SharedVehicle::new(Drive::new()));
    let mut start = StartInteractor::new(
        Arc::clone(&context),
        MqttShadowGateway::new(MockMqtt::new(), "iotrain-01"),
    );

    start.execute().unwrap();

    let published = start.shadow().client().published_to(UPDATE_TOPIC);
    assert_eq!(published.len(), 1);
    let body: Value = serde_json::from_slice(&published[0].1).unwrap();
    assert_eq!(body, json!({"state": {"reported": {"direction": "STOP", "speed": 0}}}));
    assert_eq!(context.with_vehicle(|d| d.history().len()), 1);
}

// ============================================================================
// HTTP-style path (both fields required, locomotive)
// ============================================================================

#[test]
fn all_required_locomotive_flow() {
    let context = Arc::new(SharedVehicle::new(Locomotive::new()));
    let mut interactor = OperateInteractor::new(
        Arc::clone(&context),
        MotorDriverGateway::new(MockMotorDriver::new()),
        MqttShadowGateway::new(MockMqtt::new(), "iotrain-01"),
    );

    let err = interactor
        .execute(parse(json!({"speed": 10}), FieldPolicy::AllRequired))
        .unwrap_err();
    assert_eq!(
        err.validation_errors(),
        Some(&["direction must be STOP or FORWARD or BACKWARD".to_string()][..])
    );

    interactor
        .execute(parse(json!({"direction": "FORWARD", "speed": 10}), FieldPolicy::AllRequired))
        .unwrap();
    assert_eq!(context.status().direction, Direction::Forward);
    assert_eq!(interactor.motor().driver().calls, vec![10]);
}

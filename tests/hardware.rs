// Hardware link behavior that is testable without real devices

use navscope::config::{Config, LinkConfig};
use navscope::hardware::{HardwareError, HardwareManager, SimulatedStepDriver, StepDriver};
use navscope::motion::{AxisId, StepCommand, StepDirection};
use tokio_test::assert_ok;

#[tokio::test]
async fn missing_port_fails_within_the_connect_window() {
    let mut config = Config::default();
    config.turret = LinkConfig {
        port: "/dev/does-not-exist".to_string(),
        baud: 9600,
        connect_timeout_ms: 200,
    };
    let mut hardware = HardwareManager::new(config);

    let started = std::time::Instant::now();
    let err = hardware.initialize().await.unwrap_err();
    assert!(matches!(err, HardwareError::ConnectTimeout { .. }));
    // Bounded handshake: gives up promptly instead of spinning forever.
    assert!(started.elapsed() < std::time::Duration::from_secs(2));
}

#[tokio::test]
async fn simulated_driver_counts_steps_per_axis() {
    let mut driver = SimulatedStepDriver::default();
    for _ in 0..3 {
        tokio_test::assert_ok!(
            driver
                .pulse(StepCommand {
                    axis: AxisId::Tilt,
                    direction: StepDirection::Forward,
                })
                .await
        );
    }
    tokio_test::assert_ok!(
        driver
            .pulse(StepCommand {
                axis: AxisId::Focus,
                direction: StepDirection::Backward,
            })
            .await
    );

    assert_eq!(driver.steps_for(AxisId::Tilt), 3);
    assert_eq!(driver.steps_for(AxisId::Focus), 1);
    assert_eq!(driver.steps_for(AxisId::Azimuth), 0);
}

#[test]
fn step_wire_format() {
    let forward = StepCommand {
        axis: AxisId::Azimuth,
        direction: StepDirection::Forward,
    };
    let backward = StepCommand {
        axis: AxisId::Tilt,
        direction: StepDirection::Backward,
    };
    assert_eq!(forward.to_wire(), "step azimuth 1");
    assert_eq!(backward.to_wire(), "step tilt 0");
}

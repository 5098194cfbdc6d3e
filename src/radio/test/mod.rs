use fixtures::{get_initialized_sx1262, get_sx1262, Ops, STATUS_BUSY};

use crate::config::InvalidConfig;
use crate::error::{DeviceError, Error};
use crate::radio::RadioMode;

fn write(bytes: &[u8]) -> Ops {
    Ops::Write(bytes.to_vec())
}

#[test]
fn test_init_sequence() {
    let (mut radio, fixture) = get_sx1262();
    radio.init().unwrap();

    let chip = fixture.chip();
    assert_eq!(chip.reset_levels, vec![true, false, true]);
    assert_eq!(
        chip.commands(),
        vec![
            write(&[0x1D, 0x07, 0x40, 0x00, 0x00]),
            write(&[0x9D, 0x01]),
            write(&[0x86, 0x39, 0x30, 0x00, 0x00]),
            write(&[0x8A, 0x01]),
            write(&[0x9F, 0x00]),
            write(&[0x8B, 0x07, 0x05, 0x01, 0x00]),
            write(&[0x95, 0x04, 0x07, 0x00, 0x01]),
            write(&[0x8E, 0x16, 0x02]),
            write(&[0xA0, 0x00]),
            write(&[0x08, 0x00, 0x02, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]),
        ]
    );
    // One completion poll per essential command
    assert_eq!(chip.status_polls(), 9);
    // Reset pulse plus one settle delay per poll
    assert_eq!(chip.now_ms(), 20 + 9 * 5);
    assert!(chip.nss_high);
    drop(chip);

    assert!(radio.is_initialized());
    assert_eq!(radio.mode(), RadioMode::Standby);
    assert_eq!(radio.config().frequency_hz(), 915_000_000);
}

#[test]
fn test_init_refuses_silent_chip() {
    let (mut radio, fixture) = get_sx1262();
    fixture.chip().sync_word_msb = 0x00;

    assert!(matches!(radio.init(), Err(Error::NotConnected { found: 0x00 })));
    assert_eq!(fixture.chip().opcodes(), vec![0x1D]);
    assert!(!radio.is_initialized());

    fixture.clear_ops();
    assert!(matches!(radio.transmit(b"hi"), Err(Error::Uninitialized)));
    assert!(matches!(radio.set_receive_mode(), Err(Error::Uninitialized)));
    assert!(matches!(radio.set_bandwidth(6), Err(Error::Uninitialized)));
    assert!(fixture.chip().ops.is_empty());
}

#[test]
fn test_is_connected() {
    let (mut radio, fixture) = get_sx1262();
    assert!(radio.is_connected().unwrap());

    fixture.chip().sync_word_msb = 0xFF;
    assert!(!radio.is_connected().unwrap());
}

#[test]
fn test_receive_mode_is_idempotent() {
    let (mut radio, fixture) = get_initialized_sx1262();

    radio.set_receive_mode().unwrap();
    assert_eq!(
        fixture.chip().commands(),
        vec![
            write(&[0x8C, 0x00, 0x0C, 0x00, 0xFF, 0x00, 0x00]),
            write(&[0x82, 0xFF, 0xFF, 0xFF]),
        ]
    );
    assert_eq!(radio.mode(), RadioMode::Receiving);

    let transactions = fixture.chip().ops.len();
    radio.set_receive_mode().unwrap();
    assert_eq!(fixture.chip().ops.len(), transactions);
}

#[test]
fn test_transmit_truncates_to_255_bytes() {
    let (mut radio, fixture) = get_initialized_sx1262();
    radio.set_receive_mode().unwrap();
    fixture.clear_ops();

    let data: Vec<u8> = (0..300).map(|i| i as u8).collect();
    assert_eq!(radio.transmit(&data).unwrap(), 255);

    let chip = fixture.chip();
    let mut write_buffer = vec![0x0E, 0x00];
    write_buffer.extend_from_slice(&data[..255]);
    assert_eq!(
        chip.commands(),
        vec![
            write(&[0x8C, 0x00, 0x0C, 0x00, 0xFF, 0x00, 0x00]),
            Ops::Write(write_buffer),
            write(&[0x83, 0xFF, 0xFF, 0xFF]),
        ]
    );
    assert_eq!(chip.memory[..255], data[..255]);
    drop(chip);

    assert_eq!(radio.mode(), RadioMode::Standby);
}

#[test]
fn test_transmit_leaves_receive_mode() {
    let (mut radio, fixture) = get_initialized_sx1262();
    radio.set_receive_mode().unwrap();

    radio.transmit(b"ping").unwrap();
    assert_eq!(radio.mode(), RadioMode::Standby);

    fixture.clear_ops();
    radio.set_receive_mode().unwrap();
    assert_eq!(fixture.chip().opcodes(), vec![0x8C, 0x82]);
}

#[test]
fn test_transmit_timeout_is_reported() {
    let (mut radio, fixture) = get_initialized_sx1262();
    radio.set_receive_mode().unwrap();
    {
        let mut chip = fixture.chip();
        // Packet params and buffer write complete, SetTx never does
        chip.status_queue.extend([0x22, 0x22]);
        chip.status = STATUS_BUSY;
    }
    let start = fixture.chip().now_ms();

    assert!(matches!(
        radio.transmit(b"ping"),
        Err(Error::Timeout {
            opcode: 0x83,
            waited_ms: 12_000
        })
    ));
    assert!(fixture.chip().now_ms() - start >= 12_000);
    assert_eq!(radio.mode(), RadioMode::Standby);
}

#[test]
fn test_wait_for_idle_standby_overrides_busy_command_status() {
    let (mut radio, fixture) = get_initialized_sx1262();
    {
        let mut chip = fixture.chip();
        // STBY_XOSC, command status 1
        chip.status_queue.push_back(0x32);
        chip.status = STATUS_BUSY;
    }
    let start = fixture.chip().now_ms();

    assert!(radio.wait_for_idle(100).unwrap());
    assert_eq!(fixture.chip().status_polls(), 1);
    assert_eq!(fixture.chip().now_ms() - start, 5);
}

#[test]
fn test_wait_for_idle_gives_up_at_timeout() {
    let (mut radio, fixture) = get_initialized_sx1262();
    fixture.chip().status = STATUS_BUSY;
    let start = fixture.chip().now_ms();

    assert!(!radio.wait_for_idle(50).unwrap());
    assert_eq!(fixture.chip().status_polls(), 10);
    assert_eq!(fixture.chip().now_ms() - start, 50);
}

#[test]
fn test_poll_receive_without_packet() {
    let (mut radio, fixture) = get_initialized_sx1262();

    let mut buf = [0u8; 16];
    assert_eq!(radio.poll_receive(&mut buf).unwrap(), None);
    assert_eq!(radio.mode(), RadioMode::Receiving);
    assert_eq!(fixture.chip().opcodes(), vec![0x8C, 0x82]);
}

#[test]
fn test_poll_receive_empty_packet() {
    let (mut radio, fixture) = get_initialized_sx1262();
    radio.set_receive_mode().unwrap();
    fixture.clear_ops();
    fixture.chip().dio1 = true;

    let mut buf = [0u8; 16];
    assert_eq!(radio.poll_receive(&mut buf).unwrap(), Some(0));
    assert_eq!(
        fixture.chip().commands(),
        vec![
            write(&[0x02, 0xFF, 0xFF]),
            write(&[0x14, 0x00, 0x00, 0x00, 0x00]),
            write(&[0x13, 0x00, 0x00, 0x00]),
        ]
    );
    assert!(!fixture.chip().dio1);
}

#[test]
fn test_poll_receive_truncates_and_decodes_status() {
    let (mut radio, fixture) = get_initialized_sx1262();
    radio.set_receive_mode().unwrap();
    fixture.clear_ops();
    {
        let mut chip = fixture.chip();
        chip.dio1 = true;
        chip.packet_status = [0x28, 0xF4, 0x51];
        chip.rx_payload_len = 11;
        chip.rx_start = 0x80;
        chip.memory[0x80..0x8B].copy_from_slice(b"hello world");
    }

    let mut buf = [0u8; 5];
    assert_eq!(radio.poll_receive(&mut buf).unwrap(), Some(5));
    assert_eq!(&buf, b"hello");

    let status = radio.packet_status();
    assert_eq!(status.rssi, -20);
    assert_eq!(status.snr, -3);
    assert_eq!(status.signal_rssi, -40);

    assert_eq!(
        fixture.chip().commands().last(),
        Some(&write(&[0x1E, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]))
    );
}

#[test]
fn test_poll_receive_stuck_irq_times_out() {
    let (mut radio, fixture) = get_initialized_sx1262();
    radio.set_receive_mode().unwrap();
    fixture.clear_ops();
    {
        let mut chip = fixture.chip();
        chip.dio1 = true;
        chip.irq_stuck = true;
    }

    let mut buf = [0u8; 16];
    assert!(matches!(
        radio.poll_receive(&mut buf),
        Err(Error::Timeout {
            opcode: 0x02,
            waited_ms: 100
        })
    ));
    let opcodes = fixture.chip().opcodes();
    assert!(opcodes.len() > 1);
    assert!(opcodes.iter().all(|&opcode| opcode == 0x02));
}

#[test]
fn test_blocking_receive_times_out() {
    let (mut radio, fixture) = get_initialized_sx1262();
    let start = fixture.chip().now_ms();

    let mut buf = [0u8; 16];
    assert_eq!(radio.blocking_receive(&mut buf, 1_000).unwrap(), None);
    assert!(fixture.chip().now_ms() - start >= 1_000);
    assert_eq!(radio.mode(), RadioMode::Receiving);
}

#[test]
fn test_blocking_receive_waits_for_dio1() {
    let (mut radio, fixture) = get_initialized_sx1262();
    {
        let mut chip = fixture.chip();
        chip.dio1_rises_after = Some(5);
        chip.rx_payload_len = 3;
        chip.memory[..3].copy_from_slice(b"abc");
    }

    let mut buf = [0u8; 16];
    assert_eq!(radio.blocking_receive(&mut buf, 0).unwrap(), Some(3));
    assert_eq!(&buf[..3], b"abc");
}

#[test]
fn test_chip_select_released_after_bus_error() {
    let (mut radio, fixture) = get_initialized_sx1262();
    fixture.chip().spi_fails = true;

    assert!(matches!(
        radio.transmit(b"ping"),
        Err(Error::Bus(DeviceError::BusError))
    ));
    assert!(fixture.chip().nss_high);

    // The bus recovers and the next exchange frames normally
    fixture.chip().spi_fails = false;
    radio.transmit(b"ping").unwrap();
}

#[test]
fn test_invalid_configuration_sends_nothing() {
    let (mut radio, fixture) = get_initialized_sx1262();
    let before = *radio.config();

    assert!(matches!(
        radio.set_bandwidth(7),
        Err(Error::InvalidConfig(InvalidConfig::Bandwidth(7)))
    ));
    assert!(matches!(
        radio.set_coding_rate(5),
        Err(Error::InvalidConfig(InvalidConfig::CodingRate(5)))
    ));
    assert!(matches!(
        radio.set_spreading_factor(13),
        Err(Error::InvalidConfig(InvalidConfig::SpreadingFactor(13)))
    ));
    assert!(matches!(
        radio.set_spreading_factor(4),
        Err(Error::InvalidConfig(InvalidConfig::SpreadingFactor(4)))
    ));
    assert!(matches!(
        radio.set_frequency(149_999_999),
        Err(Error::InvalidConfig(InvalidConfig::Frequency(149_999_999)))
    ));

    assert!(fixture.chip().ops.is_empty());
    assert_eq!(*radio.config(), before);
}

#[test]
fn test_set_bandwidth_pushes_modulation() {
    let (mut radio, fixture) = get_initialized_sx1262();

    radio.set_bandwidth(6).unwrap();
    assert_eq!(
        fixture.chip().commands(),
        vec![write(&[0x8B, 0x07, 0x06, 0x01, 0x00])]
    );
}

#[test]
fn test_spreading_factor_drives_ldro_and_timeout() {
    let (mut radio, fixture) = get_initialized_sx1262();

    for sf in 5..=12u8 {
        fixture.clear_ops();
        radio.set_spreading_factor(sf).unwrap();

        let ldro = sf >= 11;
        assert_eq!(radio.config().low_data_rate_optimize(), ldro);
        assert_eq!(
            fixture.chip().commands(),
            vec![write(&[0x8B, sf, 0x05, 0x01, ldro as u8])]
        );
    }
    assert_eq!(radio.config().transmit_timeout_ms(), 252_000);
}

#[test]
fn test_apply_preset_pushes_once() {
    let (mut radio, fixture) = get_initialized_sx1262();

    radio.apply_preset(crate::config::Preset::LongRange).unwrap();
    assert_eq!(
        fixture.chip().commands(),
        vec![write(&[0x8B, 0x0C, 0x04, 0x01, 0x01])]
    );
    assert_eq!(radio.config().transmit_timeout_ms(), 252_000);
}

#[test]
fn test_set_frequency() {
    let (mut radio, fixture) = get_initialized_sx1262();

    radio.set_frequency(868_000_000).unwrap();
    assert_eq!(
        fixture.chip().commands(),
        vec![write(&[0x86, 0x36, 0x40, 0x00, 0x00])]
    );
    assert_eq!(radio.config().pll_frequency(), 910_163_968);
}

#[test]
fn test_setter_timeout_keeps_previous_config() {
    let (mut radio, fixture) = get_initialized_sx1262();
    fixture.chip().status = STATUS_BUSY;

    assert!(matches!(
        radio.set_bandwidth(6),
        Err(Error::Timeout {
            opcode: 0x8B,
            waited_ms: 100
        })
    ));
    assert_eq!(radio.config().bandwidth() as u8, 0x05);
}

// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Critical-section nesting and interrupt gating for the build-selected port
//! TESTS: enter/enter/exit/exit gating, boot sentinel, ISR state restore inside task sections

use neuron_port::config::CRITICAL_NESTING_BOOT_SENTINEL;
use neuron_port::hal::host::{HostCores, HostLockBank};
use neuron_port::hal::CoreContext;
use neuron_port::{new_port, PortSync};

#[test]
fn enter_enter_exit_exit() {
    let port = new_port(HostLockBank::new());
    let cores = HostCores::new();
    let cpu = cores.core(0);
    port.scheduler_started(&cpu);
    cpu.enable_interrupts();

    port.enter_critical(&cpu);
    port.enter_critical(&cpu);
    assert!(!cpu.interrupts_enabled());
    port.exit_critical(&cpu);
    assert!(!cpu.interrupts_enabled(), "still nested after one exit");
    port.exit_critical(&cpu);
    assert!(cpu.interrupts_enabled());
    assert_eq!(port.critical_nesting(&cpu), 0);
}

#[test]
fn sections_before_scheduler_start_never_unmask() {
    let port = new_port(HostLockBank::new());
    let cores = HostCores::new();
    let cpu = cores.core(1);

    assert_eq!(port.critical_nesting(&cpu), CRITICAL_NESTING_BOOT_SENTINEL);
    port.enter_critical(&cpu);
    port.exit_critical(&cpu);
    assert!(!cpu.interrupts_enabled());
    assert!(!port.is_started());

    port.scheduler_started(&cpu);
    assert_eq!(port.critical_nesting(&cpu), 0);
    assert_eq!(port.critical_nesting(&cores.core(0)), CRITICAL_NESTING_BOOT_SENTINEL);
}

#[test]
fn isr_inside_task_section_restores_masked_state() {
    let port = new_port(HostLockBank::new());
    let cores = HostCores::new();
    let cpu = cores.core(0);
    port.scheduler_started(&cpu);
    cpu.enable_interrupts();

    port.enter_critical(&cpu);
    let saved = port.enter_critical_from_isr(&cpu);
    assert!(!saved.were_enabled());
    port.exit_critical_from_isr(&cpu, saved);
    assert!(!cpu.interrupts_enabled(), "ISR exit must not unmask a task section");
    port.exit_critical(&cpu);
    assert!(cpu.interrupts_enabled());
}

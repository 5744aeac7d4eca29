//! 控制台报告渲染
//!
//! 把 [`PackReport`] 格式化为文本面板：汇总、辅助电源、电池网格、驾驶控制、电机控制器。

use crate::layout::{HALF_PACK_MODULES, ROW_WIDTH, display_order};
use std::io::{self, Write};
use telemetry_driver::{AuxiliaryTelemetry, Extremum, ModuleSnapshot, PackReport, ReportSink};
use telemetry_protocol::FaultFrame;

const SEPARATOR: &str =
    "===============================================================================================";
const HALF_SEPARATOR: &str =
    "- - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - -";

/// 文本报告渲染器
pub struct ConsoleRenderer<W: Write> {
    out: W,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// 渲染一份完整报告
    pub fn render(&mut self, report: &PackReport) -> io::Result<()> {
        writeln!(
            self.out,
            "\n--------------------------------------------SUMMARY--------------------------------------------"
        )?;
        self.render_summary(report)?;
        writeln!(self.out, "{}", SEPARATOR)?;
        self.render_aux_dcdc(&report.auxiliary)?;
        writeln!(self.out, "{}", SEPARATOR)?;
        writeln!(
            self.out,
            "--------------------------------------------BATTERY--------------------------------------------"
        )?;
        self.render_battery(&report.modules)?;
        writeln!(self.out, "{}", SEPARATOR)?;
        self.render_driver_controls(&report.auxiliary)?;
        writeln!(self.out, "{}", SEPARATOR)?;
        self.render_motor_controller(&report.auxiliary)?;
        writeln!(self.out, "{}", SEPARATOR)?;
        self.out.flush()
    }

    fn render_summary(&mut self, report: &PackReport) -> io::Result<()> {
        let summary = &report.summary;
        let out = &mut self.out;

        writeln!(
            out,
            "Min voltage: {:6.3}     Module: {:<2}\t\t\tMin temperature: {}",
            summary.min_voltage.value,
            summary.min_voltage.module,
            fmt_extremum(summary.min_temp)
        )?;
        writeln!(
            out,
            "Max voltage: {:6.3}     Module: {:<2}\t\t\tMax temperature: {}",
            summary.max_voltage.value,
            summary.max_voltage.module,
            fmt_extremum(summary.max_temp)
        )?;
        writeln!(
            out,
            "Voltage discrepancy:\t{:6.3}\t\t\t\tTemperature discrepancy:\t{}",
            summary.voltage_discrepancy(),
            summary
                .temp_discrepancy()
                .map_or_else(|| "   n/a".to_string(), |d| format!("{:6.3}", d))
        )?;
        writeln!(
            out,
            "Average voltage:\t{:6.3}\t\t\t\tAverage temperature:\t\t{:6.3}\n",
            summary.avg_voltage, summary.avg_temp
        )?;
        writeln!(
            out,
            "Aggregate voltage:\t{:7.3}\nAggregate current: \t{:7.3}",
            report.auxiliary.pack.voltage, report.auxiliary.pack.current
        )
    }

    fn render_aux_dcdc(&mut self, aux: &AuxiliaryTelemetry) -> io::Result<()> {
        let power = &aux.aux_dcdc;
        writeln!(
            self.out,
            "Aux Voltage: {:8.2}\tAux Current: {:8.3}\tDCDC Voltage: {:8.2}\tDCDC Current: {:8.3}",
            power.aux_voltage, power.aux_current, power.dcdc_voltage, power.dcdc_current
        )
    }

    fn render_battery(&mut self, modules: &ModuleSnapshot) -> io::Result<()> {
        for (position, index) in display_order(modules.len()).into_iter().enumerate() {
            match modules.get(index) {
                Some(reading) => write!(
                    self.out,
                    "{:2}: {:4.2}V {:4.1}C",
                    index + 1,
                    reading.voltage,
                    reading.temperature
                )?,
                None => write!(self.out, "{:2}:   --V   --C", index + 1)?,
            }

            let count = position + 1;
            if count % ROW_WIDTH == 0 || count == modules.len() {
                writeln!(self.out)?;
                if count == HALF_PACK_MODULES && count < modules.len() {
                    writeln!(self.out, "{}", HALF_SEPARATOR)?;
                }
            } else {
                write!(self.out, "|")?;
            }
        }

        Ok(())
    }

    fn render_driver_controls(&mut self, aux: &AuxiliaryTelemetry) -> io::Result<()> {
        let controls = &aux.controls;
        writeln!(
            self.out,
            "Direction: {:7}  Throttle: {:7}  Brake State: {:7}  \nCruise Ctrl State: {:7}  Cruise Ctrl Target: {:7}",
            controls.direction.as_str(),
            controls.throttle,
            u8::from(controls.mechanical_brake),
            u8::from(controls.cruise_control),
            controls.cruise_target
        )?;
        writeln!(self.out, "Speed: {:9.2}KMH", controls.velocity_kmh)?;

        if let Some(lights) = aux.lights {
            writeln!(
                self.out,
                "Light: {}  State: {}",
                lights.light_id, lights.light_state
            )?;
        }

        Ok(())
    }

    fn render_motor_controller(&mut self, aux: &AuxiliaryTelemetry) -> io::Result<()> {
        let mc = &aux.motor_controller;
        writeln!(
            self.out,
            "MC Voltage 1: {}\tMC Current 1: {}",
            mc.voltage_1, mc.current_1
        )?;
        writeln!(
            self.out,
            "MC Voltage 2: {}\tMC Current 2: {}",
            mc.voltage_2, mc.current_2
        )
    }

    /// 原样打印故障帧
    pub fn render_fault(&mut self, fault: &FaultFrame) -> io::Result<()> {
        writeln!(
            self.out,
            "FAULT [{} us]: {:02X?}",
            fault.timestamp_us,
            fault.data_slice()
        )?;
        self.out.flush()
    }
}

impl<W: Write> ReportSink for ConsoleRenderer<W> {
    fn publish(&mut self, report: &PackReport) {
        if let Err(e) = self.render(report) {
            tracing::warn!("Failed to render report: {}", e);
        }
    }

    fn on_fault(&mut self, fault: &FaultFrame) {
        if let Err(e) = self.render_fault(fault) {
            tracing::warn!("Failed to render fault frame: {}", e);
        }
    }
}

fn fmt_extremum(extremum: Option<Extremum>) -> String {
    match extremum {
        Some(e) => format!("{:6.3}     Module: {}", e.value, e.module),
        None => "   n/a".to_string(),
    }
}

//! Excel export of a solved [`Schedule`].
use crate::input::ProblemInput;
use crate::schedule::Schedule;
use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use std::path::Path;

fn header(sheet: &mut Worksheet, titles: &[&str], bold: &Format) -> Result<()> {
    for (col, title) in titles.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, bold)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn office_hours_sheet(
    workbook: &mut Workbook,
    schedule: &Schedule,
    bold: &Format,
    alert: &Format,
) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Office Hours")?;
    header(sheet, &["Day", "Start", "End", "Min", "Max", "Assigned", "TAs"], bold)?;
    sheet.set_column_width(6, 40)?;

    for (id, (block, demand, tas)) in schedule.staffing().into_iter().enumerate() {
        let row = id as u32 + 1;
        let staffed = tas.len() as u32;
        sheet.write_string(row, 0, block.day.to_string())?;
        sheet.write_string(row, 1, format!("{:02}:00", block.start))?;
        sheet.write_string(row, 2, format!("{:02}:00", block.end()))?;
        sheet.write_number(row, 3, demand.lower)?;
        sheet.write_number(row, 4, demand.upper)?;
        if staffed < demand.lower || staffed > demand.upper {
            sheet.write_number_with_format(row, 5, staffed, alert)?;
        } else {
            sheet.write_number(row, 5, staffed)?;
        }
        sheet.write_string(row, 6, tas.join(", "))?;
    }
    Ok(())
}

fn recitations_sheet(workbook: &mut Workbook, schedule: &Schedule, bold: &Format) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Recitations")?;
    header(sheet, &["Slot", "Day", "Start", "End", "Leaders", "TAs"], bold)?;
    sheet.set_column_width(5, 40)?;

    for (id, (slot, tas)) in schedule.by_recitation().into_iter().enumerate() {
        let row = id as u32 + 1;
        sheet.write_number(row, 0, id as u32)?;
        sheet.write_string(row, 1, slot.day.to_string())?;
        sheet.write_string(row, 2, slot.start.to_string())?;
        sheet.write_string(row, 3, slot.end.to_string())?;
        sheet.write_number(row, 4, tas.len() as u32)?;
        sheet.write_string(row, 5, tas.join(", "))?;
    }
    Ok(())
}

fn workload_sheet(
    workbook: &mut Workbook,
    schedule: &Schedule,
    input: &ProblemInput,
    bold: &Format,
    alert: &Format,
) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Workload")?;
    header(
        sheet,
        &[
            "TA",
            "Willingness",
            "Returning",
            "OH hours",
            "Recitations",
            "Total hours",
            "Min",
            "Max",
            "Shifts",
        ],
        bold,
    )?;
    sheet.set_column_width(0, 20)?;
    sheet.set_column_width(8, 50)?;

    for (i, ta) in input.tas.iter().enumerate() {
        let row = i as u32 + 1;
        let Some(c) = schedule.commitment(&ta.name) else {
            continue;
        };
        let shifts = schedule
            .shifts_of(&ta.name)
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        sheet.write_string(row, 0, ta.name.as_str())?;
        sheet.write_number(row, 1, ta.willingness)?;
        sheet.write_boolean(row, 2, ta.returning)?;
        sheet.write_number(row, 3, c.office_hours)?;
        sheet.write_number(row, 4, c.recitations)?;
        if c.within_budget() && c.total_hours >= c.min_hours {
            sheet.write_number(row, 5, c.total_hours)?;
        } else {
            sheet.write_number_with_format(row, 5, c.total_hours, alert)?;
        }
        sheet.write_number(row, 6, c.min_hours)?;
        sheet.write_number(row, 7, c.max_hours)?;
        sheet.write_string(row, 8, shifts)?;
    }
    Ok(())
}

fn build_workbook(schedule: &Schedule, input: &ProblemInput) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let alert = Format::new().set_font_color(Color::Red).set_bold();

    office_hours_sheet(&mut workbook, schedule, &bold, &alert)?;
    recitations_sheet(&mut workbook, schedule, &bold)?;
    workload_sheet(&mut workbook, schedule, input, &bold, &alert)?;
    Ok(workbook)
}

/// Writes the "Office Hours", "Recitations" and "Workload" sheets to `path`.
///
/// Block and slot rows come from `schedule`; `input` supplies the roster details on the
/// workload sheet.
pub fn write_workbook(schedule: &Schedule, input: &ProblemInput, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut workbook = build_workbook(schedule, input)?;
    workbook
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// The same workbook as [`write_workbook`], in memory.
pub fn workbook_bytes(schedule: &Schedule, input: &ProblemInput) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(schedule, input)?;
    Ok(workbook.save_to_buffer()?)
}

use super::cli::OutputFormat;
use super::error::CliError;
use moleq::{Batch, EquilibrationResult};
use prettytable::*;
use serde::Deserialize;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

/// On-disk description of one batch: a list of molecules, each with a target
/// total charge and per-atom equilibration parameters.
#[derive(Deserialize)]
struct BatchFile {
    #[serde(default)]
    molecules: Vec<MoleculeSpec>,
}

#[derive(Deserialize)]
struct MoleculeSpec {
    #[serde(default)]
    total_charge: f64,
    atoms: Vec<AtomSpec>,
}

#[derive(Deserialize)]
struct AtomSpec {
    e: f64,
    s: f64,
}

/// A batch read from disk together with its per-atom parameter columns.
pub struct LoadedBatch {
    pub batch: Batch,
    pub electronegativity: Vec<f64>,
    pub hardness: Vec<f64>,
}

pub fn read_batch(input_spec: &str) -> Result<LoadedBatch, CliError> {
    let mut content = String::new();
    if input_spec == "-" {
        io::stdin().read_to_string(&mut content)?;
    } else {
        content = std::fs::read_to_string(input_spec).map_err(|e| CliError::Io {
            path: PathBuf::from(input_spec),
            source: e,
        })?;
    }

    let source_name = if input_spec == "-" {
        "stdin".to_string()
    } else {
        input_spec.to_string()
    };

    let parsed: BatchFile = toml::from_str(&content).map_err(|source| CliError::BatchParse {
        source_name,
        source,
    })?;

    let mut batch = Batch::new();
    let mut electronegativity = Vec::new();
    let mut hardness = Vec::new();
    for molecule in parsed.molecules {
        batch.push_molecule(molecule.atoms.len(), molecule.total_charge)?;
        for atom in molecule.atoms {
            electronegativity.push(atom.e);
            hardness.push(atom.s);
        }
    }

    Ok(LoadedBatch {
        batch,
        electronegativity,
        hardness,
    })
}

pub fn get_writer(output_path: &Option<PathBuf>) -> Result<Box<dyn Write>, CliError> {
    match output_path {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|e| CliError::Io {
                path: path.clone(),
                source: e,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

pub fn write_results(
    mut writer: Box<dyn Write>,
    loaded: &LoadedBatch,
    result: &EquilibrationResult,
    format: &OutputFormat,
    precision: usize,
    source_name: &str,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Pretty => write_pretty_tables(&mut writer, loaded, result, precision, source_name),
        OutputFormat::Csv => write_csv(&mut writer, loaded, result, precision),
        OutputFormat::Json => write_json(&mut writer, loaded, result, precision),
    }
}

fn box_format() -> format::TableFormat {
    format::FormatBuilder::new()
        .column_separator('│')
        .borders('│')
        .separators(
            &[format::LinePosition::Top],
            format::LineSeparator::new('─', '┬', '╭', '╮'),
        )
        .separators(
            &[format::LinePosition::Title],
            format::LineSeparator::new('═', '╪', '╞', '╡'),
        )
        .separators(
            &[format::LinePosition::Bottom],
            format::LineSeparator::new('─', '┴', '╰', '╯'),
        )
        .padding(1, 1)
        .build()
}

fn write_pretty_tables(
    writer: &mut dyn Write,
    loaded: &LoadedBatch,
    result: &EquilibrationResult,
    precision: usize,
    source_name: &str,
) -> Result<(), CliError> {
    let batch = &loaded.batch;
    let target_total: f64 = batch.total_charges().iter().sum();
    let computed_total: f64 = result.charges.iter().sum();

    let mut summary_table = Table::new();
    summary_table.set_format(box_format());
    summary_table.add_row(row![b->"Source File:", source_name]);
    summary_table.add_row(row![b->"Molecules:", batch.molecule_count()]);
    summary_table.add_row(row![b->"Atoms:", batch.atom_count()]);
    summary_table
        .add_row(row![b->"Target Charge:", format!("{:.prec$} e", target_total, prec = precision)]);
    summary_table.add_row(
        row![b->"Computed Charge:", format!("{:.prec$} e", computed_total, prec = precision)],
    );
    summary_table.print(writer)?;
    writeln!(writer)?;

    let mut atom_table = Table::new();
    atom_table.set_format(box_format());
    atom_table.set_titles(
        row![bc->"Index", bc->"Molecule", bc->"Electronegativity", bc->"Hardness", bc->"Charge (e)"],
    );
    for (i, &charge) in result.charges.iter().enumerate() {
        atom_table.add_row(row![
            r->i,
            r->batch.molecule_of(i),
            r->format!("{:.prec$}", loaded.electronegativity[i], prec = precision),
            r->format!("{:.prec$}", loaded.hardness[i], prec = precision),
            r->format!("{:.prec$}", charge, prec = precision)
        ]);
    }
    atom_table.print(writer)?;
    writeln!(writer)?;

    let molecule_sums = molecule_charge_sums(batch, &result.charges);
    let mut molecule_table = Table::new();
    molecule_table.set_format(box_format());
    molecule_table.set_titles(
        row![bc->"Molecule", bc->"Target (e)", bc->"Sum q (e)", bc->"Potential"],
    );
    for molecule in 0..batch.molecule_count() {
        molecule_table.add_row(row![
            r->molecule,
            r->format!("{:.prec$}", batch.total_charges()[molecule], prec = precision),
            r->format!("{:.prec$}", molecule_sums[molecule], prec = precision),
            r->format!("{:.prec$}", result.potentials[molecule], prec = precision)
        ]);
    }
    molecule_table.print(writer)?;

    Ok(())
}

fn write_csv(
    writer: &mut dyn Write,
    loaded: &LoadedBatch,
    result: &EquilibrationResult,
    precision: usize,
) -> Result<(), CliError> {
    writeln!(writer, "index,molecule,e,s,charge")?;
    for (i, &charge) in result.charges.iter().enumerate() {
        writeln!(
            writer,
            "{},{},{:.*},{:.*},{:.*}",
            i,
            loaded.batch.molecule_of(i),
            precision,
            loaded.electronegativity[i],
            precision,
            loaded.hardness[i],
            precision,
            charge
        )?;
    }
    Ok(())
}

fn write_json(
    writer: &mut dyn Write,
    loaded: &LoadedBatch,
    result: &EquilibrationResult,
    precision: usize,
) -> Result<(), CliError> {
    let batch = &loaded.batch;
    let molecule_sums = molecule_charge_sums(batch, &result.charges);

    writeln!(writer, "{{")?;
    writeln!(writer, "  \"atoms\": [")?;
    for (i, &charge) in result.charges.iter().enumerate() {
        let comma = if i < result.charges.len() - 1 { "," } else { "" };
        writeln!(writer, "    {{")?;
        writeln!(writer, "      \"index\": {},", i)?;
        writeln!(writer, "      \"molecule\": {},", batch.molecule_of(i))?;
        writeln!(
            writer,
            "      \"e\": {:.*},",
            precision, loaded.electronegativity[i]
        )?;
        writeln!(writer, "      \"s\": {:.*},", precision, loaded.hardness[i])?;
        writeln!(writer, "      \"charge\": {:.*}", precision, charge)?;
        writeln!(writer, "    }}{}", comma)?;
    }
    writeln!(writer, "  ],")?;
    writeln!(writer, "  \"molecules\": [")?;
    for molecule in 0..batch.molecule_count() {
        let comma = if molecule < batch.molecule_count() - 1 {
            ","
        } else {
            ""
        };
        writeln!(writer, "    {{")?;
        writeln!(writer, "      \"index\": {},", molecule)?;
        writeln!(
            writer,
            "      \"target_charge\": {:.*},",
            precision, batch.total_charges()[molecule]
        )?;
        writeln!(
            writer,
            "      \"computed_charge\": {:.*},",
            precision, molecule_sums[molecule]
        )?;
        writeln!(
            writer,
            "      \"potential\": {:.*}",
            precision, result.potentials[molecule]
        )?;
        writeln!(writer, "    }}{}", comma)?;
    }
    writeln!(writer, "  ]")?;
    writeln!(writer, "}}")?;
    Ok(())
}

fn molecule_charge_sums(batch: &Batch, charges: &[f64]) -> Vec<f64> {
    moleq::segment::segment_sum(charges, batch.molecule_ids(), batch.molecule_count())
}

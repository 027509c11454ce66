/*!

This is the long-form manual for `recap_engine` and `rekap`.

## Input formats

The following formats are supported:
* `xlsx` Excel workbook (the default)
* `csv` Comma Separated Values with a header line

In both cases the first row holds the column names. The columns used by the recap are:

| column          | meaning                                  |
|-----------------|------------------------------------------|
| `id_smt`        | term identifier, for example `20231`     |
| `nama_pt`       | institution name                         |
| `kode_prodi`    | study program code                       |
| `nm_prodi`      | study program name                       |
| `nm_jenj_didik` | degree level (`S1`, `D3`, ...)           |
| `jumlah_mhs`    | number of students                       |

Other columns are ignored. The names can be changed in the configuration file (see below).

### `xlsx`

The first worksheet is read unless a worksheet name is given with `--excel-worksheet-name`.
Terms and codes stored as numbers are accepted. Student counts must be whole non-negative
numbers: a single bad cell stops the run with the row number of the cell.

### `csv`

Same columns as above, values separated by commas.

## Computation

For the selected terms, the records of the target institutions are kept. Their student counts
are summed per institution: this is the total used as the denominator of every percentage.
Only then the records are filtered on the selected programs, and summed per institution and
program code. A program offered by none of the institutions still gets a row (with zeros).

Percentages are rounded to two decimals. They are relative to the whole institution, so the
percentages of a column add up to the share of the selected programs in that institution, not to 100.

If the data associates one program code with several program names or degree levels, the first
one seen is used for the row label and a warning is printed. The conflict is also listed in the
JSON summary.

## Configuration

All the options can be given in a JSON file with `--config`:

```json
{
  "outputSettings": {
    "recapName": "Rekap Surabaya",
    "outputDirectory": "output"
  },
  "dataSources": [
    {
      "provider": "xlsx",
      "filePath": "data_mahasiswa.xlsx",
      "excelWorksheetName": null
    }
  ],
  "targetInstitutions": [
    "Universitas Ciputra Surabaya",
    "Universitas Katolik Widya Mandala Surabaya",
    "Universitas Kristen Petra",
    "Universitas Surabaya",
    "Universitas Bunda Mulia"
  ],
  "selection": {
    "terms": ["20231", "20232"],
    "programs": ["Manajemen", "Akuntansi"]
  }
}
```

Relative file paths are resolved against the directory of the configuration file.
Flags passed on the command line replace the values of the file.

A data source can rename the expected columns with a `columns` object, for example
`"columns": { "term": "semester", "studentCount": "total" }`. The keys are `term`,
`institution`, `programCode`, `programName`, `degreeLevel` and `studentCount`.

## Outputs

* `--export` writes the Excel recap. When the value is an existing directory, the file is
  named `Rekapitulasi_<terms>.xlsx`.
* Without `--export`, the recap goes to `outputDirectory/Rekapitulasi_<terms>.xlsx`. The
  directory is created if needed. With `"generateChart": true`, the chart data goes next to it.
* `--chart` writes the chart data as CSV, one line per program and institution.
* `--out` writes a JSON summary (`stdout` prints it).
* `--reference` compares the JSON summary with a stored one and fails if they differ.

*/

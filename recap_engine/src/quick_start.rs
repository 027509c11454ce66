/*!

# Quick start

This example runs a recap end to end from an export of the national higher education
database (PDDikti), saved as an Excel file `data_mahasiswa.xlsx`.

**Looking at the data** The file contains one line per term, institution and study program.
Start by listing the terms and programs available in the file:

```bash
rekap -i data_mahasiswa.xlsx --list
```

```text
[2023-11-02T08:12:40Z INFO  rekap::recap] Terms: 20232, 20231, 20222
[2023-11-02T08:12:40Z INFO  rekap::recap] Programs: Akuntansi, Arsitektur, Informatika, Manajemen, ...
```

**Running the recap** Choose one or more terms with `--term`, and one or more programs with
`--program`. Both are required.

```bash
rekap -i data_mahasiswa.xlsx --term 20231 --term 20232 \
  --program Manajemen --program Informatika \
  --export .
```

The recap is printed, and written to `Rekapitulasi_20231_20232.xlsx`:

```text
                                     Universitas Ciputra Surabaya   Universitas Kristen Petra  ...
Kode    Nama Prodi    Jenjang        Jumlah Mhs      %              Jumlah Mhs      %
55201   Informatika   S1             812             9.41           1210            12.02
61201   Manajemen     S1             1543            17.88          998             9.91
```

The percentage is the share of the program among all the students of the institution
in the selected terms.

**Chart data** Add `--chart chart.csv` to get the numbers in long form, ready to be
plotted as one bar chart per program.

It is the end of this quick start. See the [manual](../manual/index.html) for the
configuration file and the other options.

*/

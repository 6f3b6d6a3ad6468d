use std::error::Error;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::assemble::Assembler;
use crate::fields::FieldTable;
use crate::userdb::StaticUserDB;

fn process_lines<T>(a: &Assembler<StaticUserDB>, text: T) -> Result<Vec<u8>, Box<dyn Error>>
where
    T: AsRef<[u8]>,
{
    let mut buf = Vec::new();
    for line in BufReader::new(text.as_ref())
        .lines()
        .filter(|line| match line {
            Ok(l) if l.is_empty() => false,
            Ok(l) if l.starts_with('#') => false,
            _ => true,
        })
    {
        let record = a.assemble(&line?);
        serde_json::to_writer(&mut buf, &record)?;
        buf.write_all(b"\n")?;
    }
    Ok(buf)
}

#[test]
fn golden() -> Result<(), Box<dyn Error>> {
    let prefix: PathBuf = "src/testdata".parse()?;

    let do_write = std::env::var_os("WRITE_GOLDEN").is_some();

    let a = Assembler::new(
        FieldTable::default(),
        Some(StaticUserDB::new([(0, "root"), (1000, "kevin")])),
    );

    for file in &["record-login.txt", "record-syscall.txt"] {
        let txtfile = prefix.join(file);
        println!("processing {}", txtfile.to_string_lossy());
        let got = process_lines(&a, std::fs::read(&txtfile)?)?;

        let mut jsonfile = txtfile.clone();
        jsonfile.set_extension("json");

        if do_write {
            println!("writing {}", jsonfile.to_string_lossy());
            std::fs::write(jsonfile, &got)?;
        } else {
            println!("comparing against {}", jsonfile.to_string_lossy());
            let expected = std::fs::read(jsonfile)?;
            print!("     got = {}", String::from_utf8_lossy(&got));
            print!("expected = {}", String::from_utf8_lossy(&expected));
            assert!(got == expected);
        }
    }

    Ok(())
}

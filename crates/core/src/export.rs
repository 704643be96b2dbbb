use crate::model::{Entry, OwnerFilter};

/// Flatten the tree into CSV rows, pre-order.
pub fn to_csv(root: &Entry, w: impl std::io::Write) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(w);
    writer.write_record(["path", "name", "owner", "asize", "dsize", "children"])?;
    write_rows(&mut writer, root)?;
    writer.flush()?;
    Ok(())
}

fn write_rows<W: std::io::Write>(writer: &mut csv::Writer<W>, entry: &Entry) -> csv::Result<()> {
    writer.write_record([
        entry.path.display().to_string(),
        entry.name.clone(),
        entry.owner.clone(),
        entry.asize.to_string(),
        entry.dsize.to_string(),
        entry.children.len().to_string(),
    ])?;
    for child in &entry.children {
        write_rows(writer, child)?;
    }
    Ok(())
}

/// JSON report: the tree itself plus a disk-usage roll-up per known owner.
pub fn to_json(root: &Entry, owners: &[String]) -> serde_json::Value {
    serde_json::json!({
        "root": root,
        "total_dsize": root.hierarchy_size(),
        "owners": owners.iter().map(|owner| serde_json::json!({
            "owner": owner,
            "dsize": root.hierarchy_size_for_owner(&OwnerFilter::parse(owner)),
        })).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn sample() -> Entry {
        Entry {
            name: "root".into(),
            path: PathBuf::from("/data"),
            asize: 0,
            dsize: 0,
            uid: 0,
            owner: "root".into(),
            children: vec![
                Entry {
                    name: "a.txt".into(),
                    path: PathBuf::from("/data/a.txt"),
                    asize: 90,
                    dsize: 100,
                    uid: 1,
                    owner: "alice".into(),
                    children: vec![],
                },
                Entry {
                    name: "b.txt".into(),
                    path: PathBuf::from("/data/b.txt"),
                    asize: 280,
                    dsize: 300,
                    uid: 2,
                    owner: "bob".into(),
                    children: vec![],
                },
            ],
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_entry() {
        let mut out = Vec::new();
        to_csv(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "path,name,owner,asize,dsize,children");
        assert_eq!(lines[2], "/data/a.txt,a.txt,alice,90,100,0");
    }

    #[test]
    fn json_report_carries_per_owner_totals() {
        let owners = vec!["*".to_string(), "alice".to_string(), "bob".to_string()];
        let report = to_json(&sample(), &owners);
        assert_eq!(report["total_dsize"], 400);
        assert_eq!(report["owners"][0]["dsize"], 400);
        assert_eq!(report["owners"][1]["owner"], "alice");
        assert_eq!(report["owners"][1]["dsize"], 100);
        assert_eq!(report["root"]["children"][1]["name"], "b.txt");
    }
}

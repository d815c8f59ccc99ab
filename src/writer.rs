use crate::models::JobPosting;
use crate::Result;
use std::fs::File;
use std::path::Path;

pub fn save_to_csv(postings: &[JobPosting], file_path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = csv::Writer::from_writer(file);

    for posting in postings {
        writer.serialize(posting)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_one_row_per_posting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postings.csv");
        let postings = vec![
            JobPosting {
                job_unique_id: "job_1".into(),
                title: Some("Data Analyst".into()),
                link: Some("https://www.indeed.com/viewjob?jk=1".into()),
                session_id: 1,
                company: None,
                description: Some("SQL, Python".into()),
            },
            JobPosting {
                job_unique_id: "job_2".into(),
                title: None,
                link: None,
                session_id: 1,
                company: Some("Acme".into()),
                description: None,
            },
        ];

        save_to_csv(&postings, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["job_unique_id", "title", "link", "session_id", "company", "description"]
        );
        let rows: Vec<JobPosting> = reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description.as_deref(), Some("SQL, Python"));
        assert_eq!(rows[1].title, None);
    }
}

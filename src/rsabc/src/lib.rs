mod bytecode;
mod link;

pub use bytecode::*;
pub use link::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_round_trips() {
        let abc = AbcFile {
            minor_version: 16,
            major_version: 46,
            ..AbcFile::default()
        };

        let mut buffer = Vec::new();
        extract(&mut buffer, &abc).unwrap();

        let parsed = parse(&mut buffer.as_slice()).unwrap();
        assert_eq!(parsed, abc);

        let linked = crate::link(&parsed).unwrap();
        assert!(linked.classes.is_empty());
    }
}

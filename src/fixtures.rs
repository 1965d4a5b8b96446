pub mod test {
    use crate::Example;

    #[derive(Example, Debug, Default, PartialEq)]
    pub struct Server {
        /// No tag: filled only from layered sources.
        pub name: String,

        #[example("localhost")]
        pub host: String,

        #[example(8080)]
        pub port: u16,

        #[example(false)]
        pub debug: bool,

        pub database: Database,
    }

    #[derive(Example, Debug, Default, PartialEq)]
    pub struct Database {
        pub url: Option<String>,

        #[example(5)]
        pub pool_size: usize,
    }

    /// Field order matters: `verbose` sits between two tagged fields.
    #[derive(Example, Debug, Default, PartialEq)]
    pub struct Tuning {
        #[example(3)]
        pub retries: u32,

        #[example(true)]
        pub verbose: bool,

        #[example(250)]
        pub backoff_ms: u64,
    }

    #[derive(Example, Debug, Default, PartialEq)]
    pub struct Peer {
        #[example("peer")]
        pub host: String,

        #[example(80)]
        pub port: u16,
    }

    #[derive(Example, Debug, Default, PartialEq)]
    pub struct Network {
        #[example("len=0")]
        pub peers: Vec<Peer>,
    }

    #[test]
    fn server_loads_defaults() {
        let mut server = Server::default();
        crate::populate(&mut server).unwrap();
        assert_eq!(server.host, "localhost");
        assert_eq!(server.port, 8080);
        assert!(!server.debug);
        assert_eq!(server.database.url, None);
        assert_eq!(server.database.pool_size, 5);
    }
}

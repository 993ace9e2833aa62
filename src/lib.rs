pub mod configuration;

pub mod chebfunerror;

pub mod math {
    pub mod chebyshev {
        pub mod transform;
        pub mod standardchop;
        pub mod evaluation;
        pub mod rootfinding;
        pub mod chebyshevseries;
    }

    pub mod domain {
        pub mod interval;
        pub mod domain;
        pub mod partition;
    }

    pub mod curve {
        pub mod curve;
        pub mod chebfun {
            pub mod boundaryfunction;
            pub mod piecewisefunction;
        }
    }
}

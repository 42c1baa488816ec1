//! The species table.
//!
//! Molar masses and NASA-7 coefficients are the GRI-Mech 3.0 values for the
//! species that take part in global methane oxidation. The table order is the
//! composition-vector order used everywhere else in the workspace.

use crate::nasa7::Nasa7;

#[derive(Debug, Clone, Copy)]
pub struct Species {
    pub name: &'static str,
    /// Molar mass [kg/mol]
    pub molar_mass: f64,
    pub thermo: Nasa7,
}

pub const N_SPECIES: usize = 6;

static TABLE: [Species; N_SPECIES] = [
    Species {
        name: "CH4",
        molar_mass: 16.043e-3,
        thermo: Nasa7 {
            t_mid: 1000.0,
            low: [
                5.14987613e+00,
                -1.36709788e-02,
                4.91800599e-05,
                -4.84743026e-08,
                1.66693956e-11,
                -1.02466476e+04,
                -4.64130376e+00,
            ],
            high: [
                7.48514950e-02,
                1.33909467e-02,
                -5.73285809e-06,
                1.22292535e-09,
                -1.01815230e-13,
                -9.46834459e+03,
                1.84373180e+01,
            ],
        },
    },
    Species {
        name: "O2",
        molar_mass: 31.998e-3,
        thermo: Nasa7 {
            t_mid: 1000.0,
            low: [
                3.78245636e+00,
                -2.99673416e-03,
                9.84730201e-06,
                -9.68129509e-09,
                3.24372837e-12,
                -1.06394356e+03,
                3.65767573e+00,
            ],
            high: [
                3.28253784e+00,
                1.48308754e-03,
                -7.57966669e-07,
                2.09470555e-10,
                -2.16717794e-14,
                -1.08845772e+03,
                5.45323129e+00,
            ],
        },
    },
    Species {
        name: "N2",
        molar_mass: 28.0134e-3,
        thermo: Nasa7 {
            t_mid: 1000.0,
            low: [
                3.29867700e+00,
                1.40824040e-03,
                -3.96322200e-06,
                5.64151500e-09,
                -2.44485400e-12,
                -1.02089990e+03,
                3.95037200e+00,
            ],
            high: [
                2.92664000e+00,
                1.48797680e-03,
                -5.68476000e-07,
                1.00970380e-10,
                -6.75335100e-15,
                -9.22797700e+02,
                5.98052800e+00,
            ],
        },
    },
    Species {
        name: "CO",
        molar_mass: 28.0101e-3,
        thermo: Nasa7 {
            t_mid: 1000.0,
            low: [
                3.57953347e+00,
                -6.10353680e-04,
                1.01681433e-06,
                9.07005884e-10,
                -9.04424499e-13,
                -1.43440860e+04,
                3.50840928e+00,
            ],
            high: [
                2.71518561e+00,
                2.06252743e-03,
                -9.98825771e-07,
                2.30053008e-10,
                -2.03647716e-14,
                -1.41518724e+04,
                7.81868772e+00,
            ],
        },
    },
    Species {
        name: "CO2",
        molar_mass: 44.0095e-3,
        thermo: Nasa7 {
            t_mid: 1000.0,
            low: [
                2.35677352e+00,
                8.98459677e-03,
                -7.12356269e-06,
                2.45919022e-09,
                -1.43699548e-13,
                -4.83719697e+04,
                9.90105222e+00,
            ],
            high: [
                3.85746029e+00,
                4.41437026e-03,
                -2.21481404e-06,
                5.23490188e-10,
                -4.72084164e-14,
                -4.87591660e+04,
                2.27163806e+00,
            ],
        },
    },
    Species {
        name: "H2O",
        molar_mass: 18.0153e-3,
        thermo: Nasa7 {
            t_mid: 1000.0,
            low: [
                4.19864056e+00,
                -2.03643410e-03,
                6.52040211e-06,
                -5.48797062e-09,
                1.77197817e-12,
                -3.02937267e+04,
                -8.49032208e-01,
            ],
            high: [
                3.03399249e+00,
                2.17691804e-03,
                -1.64072518e-07,
                -9.70419870e-11,
                1.68200992e-14,
                -3.00042971e+04,
                4.96677010e+00,
            ],
        },
    },
];

/// The full species table, in composition-vector order.
pub fn all() -> &'static [Species] {
    &TABLE
}

/// Index of a species by name, `None` if the table does not carry it.
pub fn index(name: &str) -> Option<usize> {
    TABLE.iter().position(|sp| sp.name == name)
}

pub fn lookup(name: &str) -> Option<&'static Species> {
    index(name).map(|i| &TABLE[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup() {
        assert_eq!(index("CH4"), Some(0));
        assert_eq!(index("H2O"), Some(N_SPECIES - 1));
        assert_eq!(index("AR"), None);
        assert_eq!(lookup("CO2").unwrap().name, "CO2");
    }

    #[test]
    fn molar_masses_are_plausible() {
        for sp in all() {
            assert!(sp.molar_mass > 1e-3 && sp.molar_mass < 0.1);
        }
    }
}

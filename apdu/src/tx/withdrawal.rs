// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;

use super::{TxItem, TxPhase};
use crate::{
    credential::Credential, helpers::put_u64, ApduError, ApduStatic, Command, Instruction,
    ADA_APDU_CLA,
};

/// Reward withdrawal APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                         AMOUNT (u64)                          +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                   STAKE CREDENTIAL (type + value)             /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Withdrawal {
    pub amount: u64,
    pub stake: Credential,
}

impl TxItem for Withdrawal {
    fn phase(&self) -> TxPhase {
        TxPhase::Withdrawals
    }
}

impl ApduStatic for Withdrawal {
    const CLA: u8 = ADA_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;

    fn p1(&self) -> u8 {
        self.phase() as u8
    }
}

impl Encode for Withdrawal {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(8 + self.stake.encode_len()?)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += put_u64(buff, self.amount)?;
        index += self.stake.encode(&mut buff[index..])?;

        Ok(index)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::KEY_HASH_LEN;

    #[test]
    fn encode_withdrawal() {
        let w = Withdrawal {
            amount: 111,
            stake: Credential::ScriptHash([0x0a; KEY_HASH_LEN]),
        };

        let f = w.frame().unwrap();
        assert_eq!(f.p1(), 0x07);
        assert_eq!(&f.payload()[..9], &[0, 0, 0, 0, 0, 0, 0, 111, 0x01]);
        assert_eq!(f.payload().len(), 8 + 1 + KEY_HASH_LEN);
    }
}
